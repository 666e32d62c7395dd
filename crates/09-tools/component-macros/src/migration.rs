//! 迁移与数据填充注册宏实现

use crate::utils::{
    collect_fields, construct_expr, default_value, factory_fn_name, inject_fields_impl, int_value,
    registration_fn_name, reject_arguments, reject_generics, str_value,
};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, punctuated::Punctuated, Error, ItemStruct, Meta, Result,
    Token,
};

/// 数据填充器参数
#[derive(Debug, Clone, Default)]
pub struct SeederArgs {
    /// 优先级, 未指定时使用运行时默认值
    pub priority: Option<i32>,
    /// 自定义名称, 默认为结构体名称
    pub name: Option<String>,
}

impl Parse for SeederArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = SeederArgs::default();

        let parsed = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;

        for meta in parsed {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("priority") => {
                    args.priority = Some(int_value(&nv.value)?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    args.name = Some(str_value(&nv.value)?);
                }
                other => {
                    return Err(Error::new_spanned(
                        other,
                        "#[seeder] 只支持 priority = N 和 name = \"...\"",
                    ))
                }
            }
        }

        Ok(args)
    }
}

/// 展开 `#[migration]`
///
/// 迁移实例的所有字段取默认值, 迁移本身由 `Migration` 的实现描述。
pub fn expand_migration(args: TokenStream, item: ItemStruct) -> Result<TokenStream> {
    reject_arguments(&args, "migration")?;
    reject_generics(&item, "migration")?;

    let name = &item.ident;
    let fields = collect_fields(&item);
    let construct = construct_expr(&item, &fields, |_, _| {
        quote! { ::std::default::Default::default() }
    });
    let factory_fn = factory_fn_name("migration", name);
    let registration_fn = registration_fn_name("migration", name);

    Ok(quote! {
        #item

        #[doc(hidden)]
        fn #factory_fn() -> ::std::boxed::Box<dyn ::data_migrations::Migration> {
            ::std::boxed::Box::new(#construct)
        }

        #[doc(hidden)]
        #[::ctor::ctor]
        fn #registration_fn() {
            ::data_migrations::submit_migration(::data_migrations::MigrationRegistration::new(
                ::std::module_path!(),
                #factory_fn,
            ));
        }
    })
}

/// 展开 `#[seeder]`
///
/// 生成 `InjectFields` 实现和工厂函数, `Inject<T>` 字段在执行前由容器注入。
pub fn expand_seeder(args: SeederArgs, item: ItemStruct) -> Result<TokenStream> {
    reject_generics(&item, "seeder")?;

    let name = &item.ident;
    let seeder_name = args.name.unwrap_or_else(|| name.to_string());
    let fields = collect_fields(&item);
    let construct = construct_expr(&item, &fields, |_, field| default_value(field));
    let inject_fields = inject_fields_impl(&item, &fields);
    let factory_fn = factory_fn_name("seeder", name);
    let registration_fn = registration_fn_name("seeder", name);

    let priority = args
        .priority
        .map(|priority| quote! { .with_priority(#priority) });

    Ok(quote! {
        #item

        #inject_fields

        #[doc(hidden)]
        fn #factory_fn() -> ::std::boxed::Box<dyn ::data_migrations::Seeder> {
            ::std::boxed::Box::new(#construct)
        }

        #[doc(hidden)]
        #[::ctor::ctor]
        fn #registration_fn() {
            ::data_migrations::submit_seeder(
                ::data_migrations::SeederRegistration::new(
                    #seeder_name,
                    ::std::module_path!(),
                    #factory_fn,
                )
                #priority,
            );
        }
    })
}
