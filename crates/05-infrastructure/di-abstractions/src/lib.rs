//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件模型、依赖解析和组件发现的核心接口。
//!
//! ## 核心接口
//!
//! - [`Injectable`] - 可由容器构造的组件
//! - [`Constructor`] - 带显式依赖参数列表的构造函数
//! - [`Inject`] - 字段注入点
//! - [`ComponentResolver`] - 依赖解析器接口
//! - [`ComponentManifest`] - 组件清单（替代运行时注解扫描）
//! - [`ComponentScanner`] - 组件扫描器接口

pub mod component;
pub mod factory;
pub mod inject;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use component::*;
pub use factory::*;
pub use inject::*;
pub use registry::*;
pub use resolver::*;
pub use scanner::*;

pub use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
