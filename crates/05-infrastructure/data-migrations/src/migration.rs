//! 迁移定义和迁移清单

use crate::schema::Schema;
use async_trait::async_trait;
use di_abstractions::namespace_matches;
use infrastructure_common::MigrationResult;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use tracing::debug;

/// 数据库迁移
///
/// 迁移本身不保存状态, 是否已执行只由迁移记录表决定。
/// `id` 是迁移的永久标识, 约定以时间戳开头, 例如 `2024_01_15_000001_create_users`。
#[async_trait]
pub trait Migration: Send + Sync {
    /// 迁移标识, 发布后不可修改
    fn id(&self) -> &str;

    /// 应用迁移
    async fn up(&self, schema: &mut Schema<'_>) -> MigrationResult<()>;

    /// 撤销迁移
    async fn down(&self, schema: &mut Schema<'_>) -> MigrationResult<()>;
}

/// 迁移工厂
pub type MigrationFactory = fn() -> Box<dyn Migration>;

/// 迁移注册信息
#[derive(Clone, Copy)]
pub struct MigrationRegistration {
    /// 声明迁移的模块路径
    pub module_path: &'static str,
    /// 创建迁移实例
    pub factory: MigrationFactory,
}

impl MigrationRegistration {
    /// 创建注册信息
    pub fn new(module_path: &'static str, factory: MigrationFactory) -> Self {
        Self {
            module_path,
            factory,
        }
    }

    /// 创建迁移实例
    pub fn instantiate(&self) -> Box<dyn Migration> {
        (self.factory)()
    }
}

impl fmt::Debug for MigrationRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRegistration")
            .field("module_path", &self.module_path)
            .finish_non_exhaustive()
    }
}

static GLOBAL_MIGRATION_MANIFEST: Lazy<RwLock<MigrationManifest>> =
    Lazy::new(|| RwLock::new(MigrationManifest::new()));

/// 迁移清单
#[derive(Debug, Clone, Default)]
pub struct MigrationManifest {
    registrations: Vec<MigrationRegistration>,
}

impl MigrationManifest {
    /// 创建空清单
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交迁移
    pub fn submit(&mut self, registration: MigrationRegistration) {
        self.registrations.push(registration);
    }

    /// 以构建器方式添加迁移
    pub fn with(mut self, module_path: &'static str, factory: MigrationFactory) -> Self {
        self.submit(MigrationRegistration::new(module_path, factory));
        self
    }

    /// 命名空间内的迁移
    pub fn migrations_in(&self, namespace: &str) -> Vec<MigrationRegistration> {
        self.registrations
            .iter()
            .filter(|registration| namespace_matches(registration.module_path, namespace))
            .copied()
            .collect()
    }

    /// 迁移数量
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// 清单是否为空
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// 提交迁移到全局清单
///
/// 由 `#[migration]` 宏生成的启动函数调用。
pub fn submit_migration(registration: MigrationRegistration) {
    debug!("提交迁移到全局清单: {}", registration.module_path);
    GLOBAL_MIGRATION_MANIFEST.write().submit(registration);
}

/// 获取全局迁移清单的快照
pub fn global_migration_manifest() -> MigrationManifest {
    GLOBAL_MIGRATION_MANIFEST.read().clone()
}
