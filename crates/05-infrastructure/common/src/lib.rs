//! # Infrastructure Common
//!
//! 这个 crate 提供了 Obsidian 基础设施层共享的错误类型和类型元数据。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] - 依赖注入容器错误
//! - [`DatabaseError`] - 数据库访问错误
//! - [`MigrationError`] - 迁移执行错误
//! - [`SeedError`] - 数据填充错误
//! - [`ConfigError`] - 配置加载错误
//! - [`InfrastructureError`] - 启动流程的聚合错误
//! - [`TypeInfo`] - 类型标识信息
//!
//! ## 设计原则
//!
//! - 预期内的失败全部以错误值返回
//! - 错误沿调用链原样向上传播，由进程入口统一处理

pub mod errors;
pub mod metadata;

pub use errors::*;
pub use metadata::*;
