//! # Data Abstractions
//!
//! 数据库访问抽象层。迁移、数据填充和启动流程只依赖这里定义的接口,
//! 具体驱动由 `data-sqlx` 提供。
//!
//! ## 核心接口
//!
//! - [`Dialect`] - 支持的数据库类型（封闭枚举）
//! - [`SqlValue`] - 语句参数和标量查询结果
//! - [`Connection`] - 执行语句和标量查询
//! - [`Transaction`] - 可提交或回滚的连接
//! - [`Database`] - 连接和事务的来源
//! - [`DatabaseSettings`] - 数据库连接配置

pub mod connection;
pub mod dialect;
pub mod settings;
pub mod value;

pub use connection::*;
pub use dialect::*;
pub use settings::*;
pub use value::*;

pub use infrastructure_common::{DatabaseError, DatabaseResult};
