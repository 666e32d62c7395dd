//! 数据填充
//!
//! 数据填充器在迁移完成后按优先级依次执行, 执行前由容器完成字段注入。

use async_trait::async_trait;
use data_abstractions::{Connection, Database};
use di_abstractions::{namespace_matches, InjectFields};
use di_impl::Container;
use infrastructure_common::{SeedError, SeedResult};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 未指定时的优先级
pub const DEFAULT_SEEDER_PRIORITY: i32 = 100;

/// 数据填充器
#[async_trait]
pub trait Seeder: InjectFields {
    /// 写入初始数据
    async fn seed(&self, connection: &mut dyn Connection) -> SeedResult<()>;
}

/// 数据填充器工厂
pub type SeederFactory = fn() -> Box<dyn Seeder>;

/// 数据填充器注册信息
#[derive(Clone, Copy)]
pub struct SeederRegistration {
    /// 填充器名称
    pub name: &'static str,
    /// 声明填充器的模块路径
    pub module_path: &'static str,
    /// 优先级, 数值小的先执行
    pub priority: i32,
    /// 创建填充器实例
    pub factory: SeederFactory,
}

impl SeederRegistration {
    /// 创建注册信息, 使用默认优先级
    pub fn new(name: &'static str, module_path: &'static str, factory: SeederFactory) -> Self {
        Self {
            name,
            module_path,
            priority: DEFAULT_SEEDER_PRIORITY,
            factory,
        }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 创建填充器实例
    pub fn instantiate(&self) -> Box<dyn Seeder> {
        (self.factory)()
    }
}

impl fmt::Debug for SeederRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeederRegistration")
            .field("name", &self.name)
            .field("module_path", &self.module_path)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

static GLOBAL_SEEDER_MANIFEST: Lazy<RwLock<SeederManifest>> =
    Lazy::new(|| RwLock::new(SeederManifest::new()));

/// 数据填充器清单
#[derive(Debug, Clone, Default)]
pub struct SeederManifest {
    registrations: Vec<SeederRegistration>,
}

impl SeederManifest {
    /// 创建空清单
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交填充器
    pub fn submit(&mut self, registration: SeederRegistration) {
        self.registrations.push(registration);
    }

    /// 以构建器方式添加填充器
    pub fn with(mut self, registration: SeederRegistration) -> Self {
        self.submit(registration);
        self
    }

    /// 命名空间内的填充器, 按优先级和名称排序
    pub fn seeders_in(&self, namespace: &str) -> Vec<SeederRegistration> {
        let mut seeders: Vec<_> = self
            .registrations
            .iter()
            .filter(|registration| namespace_matches(registration.module_path, namespace))
            .copied()
            .collect();
        seeders.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(b.name)));
        seeders
    }

    /// 填充器数量
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// 清单是否为空
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// 提交填充器到全局清单
///
/// 由 `#[seeder]` 宏生成的启动函数调用。
pub fn submit_seeder(registration: SeederRegistration) {
    debug!(
        "提交数据填充器到全局清单: {} (优先级 {})",
        registration.name, registration.priority
    );
    GLOBAL_SEEDER_MANIFEST.write().submit(registration);
}

/// 获取全局填充器清单的快照
pub fn global_seeder_manifest() -> SeederManifest {
    GLOBAL_SEEDER_MANIFEST.read().clone()
}

/// 数据填充执行器
pub struct SeederRunner {
    container: Arc<Container>,
    database: Arc<dyn Database>,
}

impl SeederRunner {
    /// 创建执行器
    pub fn new(container: Arc<Container>, database: Arc<dyn Database>) -> Self {
        Self {
            container,
            database,
        }
    }

    /// 执行全局清单中命名空间内的填充器, 返回执行数量
    pub async fn run(&self, namespace: &str) -> SeedResult<usize> {
        self.run_from(&global_seeder_manifest(), namespace).await
    }

    /// 执行指定清单中命名空间内的填充器
    ///
    /// 第一个失败的填充器会中止整个过程。
    pub async fn run_from(&self, manifest: &SeederManifest, namespace: &str) -> SeedResult<usize> {
        info!("加载数据填充器...");
        let seeders = manifest.seeders_in(namespace);
        let mut connection = self.database.connection().await?;

        for registration in &seeders {
            self.execute(registration, connection.as_mut())
                .await
                .map_err(|error| {
                    error!("数据填充失败: {}: {}", registration.name, error);
                    SeedError::SeederFailed {
                        seeder: registration.name.to_string(),
                        message: error.to_string(),
                    }
                })?;
            info!("数据填充完成: {}", registration.name);
        }

        info!("已执行 {} 个数据填充器", seeders.len());
        Ok(seeders.len())
    }

    async fn execute(
        &self,
        registration: &SeederRegistration,
        connection: &mut dyn Connection,
    ) -> SeedResult<()> {
        let seeder = registration.instantiate();
        self.container.inject_fields(seeder.as_ref())?;
        seeder.seed(connection).await
    }
}

impl fmt::Debug for SeederRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeederRunner")
            .field("container", &self.container)
            .field("dialect", &self.database.dialect())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl InjectFields for Noop {}

    #[async_trait]
    impl Seeder for Noop {
        async fn seed(&self, _connection: &mut dyn Connection) -> SeedResult<()> {
            Ok(())
        }
    }

    fn noop() -> Box<dyn Seeder> {
        Box::new(Noop)
    }

    #[test]
    fn test_seeders_sorted_by_priority_then_name() {
        let manifest = SeederManifest::new()
            .with(SeederRegistration::new("Products", "shop::seeders", noop))
            .with(SeederRegistration::new("Roles", "shop::seeders", noop).with_priority(1))
            .with(SeederRegistration::new("Admins", "shop::seeders", noop).with_priority(10))
            .with(SeederRegistration::new("Categories", "shop::seeders", noop))
            .with(SeederRegistration::new("Other", "blog::seeders", noop));

        let names: Vec<_> = manifest
            .seeders_in("shop")
            .iter()
            .map(|registration| registration.name)
            .collect();
        assert_eq!(names, ["Roles", "Admins", "Categories", "Products"]);
    }

    #[test]
    fn test_default_priority() {
        let registration = SeederRegistration::new("Noop", module_path!(), noop);
        assert_eq!(registration.priority, DEFAULT_SEEDER_PRIORITY);
    }
}
