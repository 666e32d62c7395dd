//! 组件注册宏实现

use crate::utils::{
    collect_fields, construct_expr, default_value, inject_fields_impl, registration_fn_name,
    reject_arguments, reject_generics, FieldKind,
};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Ident, ItemStruct, Result};

/// 组件标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Service,
    Repository,
}

impl Marker {
    /// 属性名称
    pub fn attribute(self) -> &'static str {
        match self {
            Marker::Service => "service",
            Marker::Repository => "repository",
        }
    }

    fn variant(self) -> TokenStream {
        match self {
            Marker::Service => quote! { ::di_abstractions::ComponentMarker::Service },
            Marker::Repository => quote! { ::di_abstractions::ComponentMarker::Repository },
        }
    }
}

/// 展开 `#[service]` / `#[repository]`
///
/// `Arc<T>` 字段按声明顺序成为构造函数参数, `Inject<T>` 字段在构造后注入,
/// 其余字段取默认值。
pub fn expand_component(marker: Marker, args: TokenStream, item: ItemStruct) -> Result<TokenStream> {
    let attribute = marker.attribute();
    reject_arguments(&args, attribute)?;
    reject_generics(&item, attribute)?;

    let name = &item.ident;
    let fields = collect_fields(&item);

    let mut bindings = Vec::new();
    let mut dependency_types = Vec::new();
    let construct = construct_expr(&item, &fields, |index, field| match &field.kind {
        FieldKind::Dependency(ty) => {
            let binding = Ident::new(&format!("__dependency_{}", index), Span::call_site());
            bindings.push(binding.clone());
            dependency_types.push(ty.clone());
            quote! { #binding }
        }
        _ => default_value(field),
    });

    let field_infos = fields.iter().filter_map(|field| match &field.kind {
        FieldKind::Injected(ty) => {
            let field_name = &field.name;
            Some(quote! { ::di_abstractions::FieldInfo::new::<#ty>(#field_name) })
        }
        _ => None,
    });

    let marker_variant = marker.variant();
    let inject_fields = inject_fields_impl(&item, &fields);
    let registration_fn = registration_fn_name(attribute, name);

    Ok(quote! {
        #item

        #inject_fields

        impl ::di_abstractions::Injectable for #name {
            fn marker() -> ::std::option::Option<::di_abstractions::ComponentMarker> {
                ::std::option::Option::Some(#marker_variant)
            }

            fn constructors() -> ::std::vec::Vec<::di_abstractions::Constructor<Self>> {
                ::std::vec![::di_abstractions::Constructor::new(
                    |(#(#bindings,)*): (#(#dependency_types,)*)| #construct
                )]
            }

            fn injectable_fields() -> ::std::vec::Vec<::di_abstractions::FieldInfo> {
                ::std::vec![#(#field_infos),*]
            }
        }

        // 程序启动时提交到全局组件清单
        #[doc(hidden)]
        #[::ctor::ctor]
        fn #registration_fn() {
            ::di_abstractions::submit_component(
                ::di_abstractions::ComponentDescriptor::of::<#name>()
                    .with_module_path(::std::module_path!()),
            );
        }
    })
}
