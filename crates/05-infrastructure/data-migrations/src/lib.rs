//! # Data Migrations
//!
//! 数据库结构迁移和初始数据填充。
//!
//! ## 核心类型
//!
//! - [`Migration`] - 带永久标识的迁移, 通过 [`Schema`] 和 [`Blueprint`] 描述表结构
//! - [`MigrationManager`] - 在单个事务中执行或撤销一批迁移
//! - [`MigrationLedger`] - 记录已执行迁移的 `migrations` 表
//! - [`Seeder`] / [`SeederRunner`] - 按优先级执行的数据填充器

pub mod blueprint;
pub mod ledger;
pub mod manager;
pub mod migration;
pub mod schema;
pub mod seeder;

pub use blueprint::Blueprint;
pub use ledger::MigrationLedger;
pub use manager::{MigrationManager, MigrationReport, MigrationState, MigrationStatus};
pub use migration::{
    global_migration_manifest, submit_migration, Migration, MigrationFactory, MigrationManifest,
    MigrationRegistration,
};
pub use schema::Schema;
pub use seeder::{
    global_seeder_manifest, submit_seeder, Seeder, SeederFactory, SeederManifest,
    SeederRegistration, SeederRunner, DEFAULT_SEEDER_PRIORITY,
};

pub use infrastructure_common::{MigrationError, MigrationResult, SeedError, SeedResult};
