//! # Component Macros
//!
//! 这个 crate 提供了把类型提交到全局清单的属性宏。
//!
//! ## 核心宏
//!
//! - [`service`] / [`repository`] - 组件注册, 生成 `Injectable` 实现
//! - [`migration`] - 迁移注册
//! - [`seeder`] - 数据填充器注册
//!
//! 生成的代码引用 `di_abstractions`、`data_migrations` 和 `ctor`,
//! 使用方需要直接依赖这些 crate。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::{repository, service};
//! use std::sync::Arc;
//!
//! #[repository]
//! pub struct OrderRepository;
//!
//! #[service]
//! pub struct OrderService {
//!     repository: Arc<OrderRepository>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemStruct};

mod component;
mod migration;
mod utils;

use component::Marker;
use migration::SeederArgs;

/// 业务服务注册宏
///
/// 为结构体实现 `InjectFields` 和 `Injectable`（标记为 service）,
/// 并在程序启动时把组件描述符提交到全局组件清单, 命名空间为声明所在的模块路径。
///
/// - `Arc<T>` 字段按声明顺序作为构造函数参数
/// - `Inject<T>` 字段在构造后由容器注入
/// - 其他字段使用 `Default::default()`
///
/// # 示例
///
/// ```rust,ignore
/// #[service]
/// pub struct OrderService {
///     repository: Arc<OrderRepository>,
///     clock: Inject<dyn Clock>,
/// }
/// ```
#[proc_macro_attribute]
pub fn service(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    component::expand_component(Marker::Service, args.into(), item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 数据仓储注册宏
///
/// 与 [`service`] 相同, 组件标记为 repository。
#[proc_macro_attribute]
pub fn repository(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    component::expand_component(Marker::Repository, args.into(), item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 迁移注册宏
///
/// 结构体需要另外实现 `data_migrations::Migration`。
///
/// # 示例
///
/// ```rust,ignore
/// #[migration]
/// pub struct CreateUsers;
///
/// #[async_trait]
/// impl Migration for CreateUsers {
///     fn id(&self) -> &str {
///         "2024_01_15_000001_create_users"
///     }
///     // up / down
/// }
/// ```
#[proc_macro_attribute]
pub fn migration(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    migration::expand_migration(args.into(), item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 数据填充器注册宏
///
/// # 参数
///
/// - `priority = N` - 优先级, 数值小的先执行（默认为 100）
/// - `name = "custom_name"` - 自定义名称
///
/// 结构体需要另外实现 `data_migrations::Seeder`, `InjectFields` 由宏生成。
///
/// # 示例
///
/// ```rust,ignore
/// #[seeder(priority = 10)]
/// pub struct AdminUserSeeder {
///     passwords: Inject<PasswordPolicy>,
/// }
/// ```
#[proc_macro_attribute]
pub fn seeder(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as SeederArgs);
    let item = parse_macro_input!(input as ItemStruct);
    migration::expand_seeder(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
