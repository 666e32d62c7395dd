use component_macros::{repository, service};
use di_abstractions::{global_component_manifest, ComponentMarker, Inject, Injectable};
use di_impl::Container;
use std::sync::Arc;

#[repository]
struct Store;

#[service]
struct Wrapper(Arc<Store>, u8);

#[service]
struct Reader {
    store: Arc<Store>,
    wrapper: Inject<Wrapper>,
    label: String,
}

fn main() {
    let container = Container::new();
    for descriptor in global_component_manifest().components_in("") {
        container.register_descriptor(descriptor);
    }

    let reader = container.resolve::<Reader>().unwrap();
    let wrapper = reader.wrapper.get().unwrap();
    assert!(Arc::ptr_eq(&reader.store, &wrapper.0));
    assert_eq!(wrapper.1, 0);
    assert_eq!(reader.label, "");
    assert_eq!(Store::marker(), Some(ComponentMarker::Repository));
}
