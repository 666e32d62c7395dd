//! 容器与组件扫描的跨 crate 集成测试

use di_abstractions::{
    submit_component, ComponentDescriptor, ComponentManifest, ComponentMarker, Constructor,
    InjectFields, Injectable,
};
use di_impl::Container;
use infrastructure_common::DependencyError;
use infrastructure_composition::ManifestComponentScanner;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

/// 计数器仓储, 记录构造次数
struct CounterRepository;

impl InjectFields for CounterRepository {}

impl Injectable for CounterRepository {
    fn marker() -> Option<ComponentMarker> {
        Some(ComponentMarker::Repository)
    }

    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|()| {
            CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
            CounterRepository
        })]
    }
}

trait Notifier: Send + Sync {
    fn channel(&self) -> &'static str;
}

/// 未标记的实现, 只能通过绑定进入容器
struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }
}

impl InjectFields for EmailNotifier {}

impl Injectable for EmailNotifier {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|()| EmailNotifier)]
    }
}

struct AlertService {
    notifier: Arc<dyn Notifier>,
}

impl InjectFields for AlertService {}

impl Injectable for AlertService {
    fn marker() -> Option<ComponentMarker> {
        Some(ComponentMarker::Service)
    }

    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(
            |(notifier,): (Arc<dyn Notifier>,)| AlertService { notifier },
        )]
    }
}

#[derive(Debug)]
struct Left;
struct Middle;
struct Right;

macro_rules! cyclic_component {
    ($name:ident, $next:ident) => {
        impl InjectFields for $name {}

        impl Injectable for $name {
            fn marker() -> Option<ComponentMarker> {
                Some(ComponentMarker::Service)
            }

            fn constructors() -> Vec<Constructor<Self>> {
                vec![Constructor::new(|(_next,): (Arc<$next>,)| $name)]
            }
        }
    };
}

cyclic_component!(Left, Middle);
cyclic_component!(Middle, Right);
cyclic_component!(Right, Left);

static SUBMIT: Once = Once::new();

/// 把测试组件提交到全局清单（只提交一次）
fn submit_test_components() {
    SUBMIT.call_once(|| {
        submit_component(
            ComponentDescriptor::of::<CounterRepository>().with_module_path("alerts::storage"),
        );
        submit_component(
            ComponentDescriptor::of::<AlertService>().with_module_path("alerts::services"),
        );
        submit_component(
            ComponentDescriptor::of::<EmailNotifier>().with_module_path("alerts::services"),
        );
    });
}

#[test]
fn test_concurrent_threads_share_one_singleton() {
    let container = Arc::new(Container::new());
    container.register::<CounterRepository>();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            thread::spawn(move || container.resolve::<CounterRepository>().unwrap())
        })
        .collect();

    let resolved: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert!(CONSTRUCTED.load(Ordering::SeqCst) >= 1);
    let first = container.resolve::<CounterRepository>().unwrap();
    assert!(resolved.iter().all(|instance| Arc::ptr_eq(instance, &first)));
}

#[test]
fn test_three_way_cycle_reports_full_chain() {
    let container = Container::new();
    container.register::<Left>();
    container.register::<Middle>();
    container.register::<Right>();

    match container.resolve::<Left>().unwrap_err() {
        DependencyError::CircularDependency {
            dependency_chain, ..
        } => assert_eq!(dependency_chain, "Left -> Middle -> Right -> Left"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(container.singleton_count(), 0);
}

#[test]
fn test_scanner_loads_global_manifest_with_binding() {
    submit_test_components();
    let container = Container::new();
    container.bind::<dyn Notifier, EmailNotifier>(|notifier| notifier as Arc<dyn Notifier>);

    let loaded = ManifestComponentScanner::new()
        .scan_namespace(&container, "alerts")
        .unwrap();

    // EmailNotifier 未标记, 不计入扫描结果
    assert_eq!(loaded, 2);
    let alerts = container.resolve::<AlertService>().unwrap();
    assert_eq!(alerts.notifier.channel(), "email");
    assert!(Arc::ptr_eq(
        &alerts.notifier,
        &container.resolve::<dyn Notifier>().unwrap()
    ));
}

#[test]
fn test_scanner_without_binding_fails_fast() {
    submit_test_components();
    let container = Container::new();

    let error = ManifestComponentScanner::new()
        .scan_namespace(&container, "alerts::services")
        .unwrap_err();

    assert!(matches!(
        error,
        DependencyError::ComponentNotRegistered { .. }
    ));
    assert!(!container.has_instance::<AlertService>());
}

#[test]
fn test_explicit_manifest_ignores_global_entries() {
    submit_test_components();
    let container = Container::new();
    let scanner = ManifestComponentScanner::with_manifest(
        ComponentManifest::new().with::<CounterRepository>(),
    );

    assert_eq!(scanner.scan_namespace(&container, "alerts").unwrap(), 0);
    assert_eq!(scanner.scan_namespace(&container, "").unwrap(), 1);
    assert!(container.has_instance::<CounterRepository>());
}

#[tokio::test]
async fn test_clear_allows_a_fresh_graph() -> anyhow::Result<()> {
    let container = Container::new();
    container.bind::<dyn Notifier, EmailNotifier>(|notifier| notifier as Arc<dyn Notifier>);
    container.register::<AlertService>();
    let before = container.resolve::<AlertService>()?;

    container.clear();
    assert!(container.resolve::<AlertService>().is_err());

    container.bind::<dyn Notifier, EmailNotifier>(|notifier| notifier as Arc<dyn Notifier>);
    container.register::<AlertService>();
    let after = container.resolve::<AlertService>()?;
    assert!(!Arc::ptr_eq(&before, &after));
    Ok(())
}
