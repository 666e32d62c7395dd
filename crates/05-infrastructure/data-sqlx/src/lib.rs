//! # Data Sqlx
//!
//! 基于 `sqlx::AnyPool` 的数据库访问实现, 支持 SQLite、MySQL 和 PostgreSQL。

pub mod connection;
pub mod database;
pub mod options;

pub use connection::{SqlxConnection, SqlxTransaction};
pub use database::{PoolSettings, SqlxDatabase};
pub use options::{connection_url, redacted};
