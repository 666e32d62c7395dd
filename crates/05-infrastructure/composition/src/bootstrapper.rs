//! 应用启动器
//!
//! 启动顺序: 配置 → 数据库连接 → 迁移 → 数据填充 → 组件扫描。
//! 任一步骤失败都会中止启动并关闭已建立的数据库连接。

use crate::component_scanner::ManifestComponentScanner;
use crate::settings::{ObsidianSettings, SettingsLoader};
use data_abstractions::Database;
use data_migrations::{
    global_migration_manifest, global_seeder_manifest, MigrationManager, MigrationManifest,
    SeederManifest, SeederRunner,
};
use data_sqlx::SqlxDatabase;
use di_abstractions::{global_component_manifest, ComponentManifest};
use di_impl::Container;
use infrastructure_common::InfrastructureResult;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// 启动完成的应用
pub struct ObsidianApplication {
    container: Arc<Container>,
    database: Arc<dyn Database>,
    settings: ObsidianSettings,
    migrations: MigrationManifest,
}

impl ObsidianApplication {
    /// 依赖注入容器
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// 数据库
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    /// 生效的配置
    pub fn settings(&self) -> &ObsidianSettings {
        &self.settings
    }

    /// 加载了应用命名空间内全部迁移的管理器
    pub fn migration_manager(&self) -> InfrastructureResult<MigrationManager> {
        let mut manager = MigrationManager::new(Arc::clone(&self.database));
        manager.discover_from(&self.migrations, &self.settings.app.base_namespace)?;
        Ok(manager)
    }

    /// 关闭数据库连接
    pub async fn shutdown(&self) {
        info!("应用正在关闭");
        self.database.close().await;
    }
}

impl fmt::Debug for ObsidianApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObsidianApplication")
            .field("container", &self.container)
            .field("dialect", &self.database.dialect())
            .field("settings", &self.settings)
            .finish()
    }
}

/// 应用启动器
///
/// 未显式提供的配置、容器和清单使用默认来源（配置加载器、新容器、全局清单）。
#[derive(Debug)]
pub struct ObsidianBootstrapper {
    loader: SettingsLoader,
    settings: Option<ObsidianSettings>,
    container: Option<Arc<Container>>,
    components: Option<ComponentManifest>,
    migrations: Option<MigrationManifest>,
    seeders: Option<SeederManifest>,
    run_migrations: bool,
}

impl ObsidianBootstrapper {
    /// 创建启动器
    pub fn new() -> Self {
        Self {
            loader: SettingsLoader::new(),
            settings: None,
            container: None,
            components: None,
            migrations: None,
            seeders: None,
            run_migrations: true,
        }
    }

    /// 使用指定的配置加载器
    pub fn with_loader(mut self, loader: SettingsLoader) -> Self {
        self.loader = loader;
        self
    }

    /// 直接使用给定配置, 跳过配置加载
    pub fn with_settings(mut self, settings: ObsidianSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// 使用已有的容器
    pub fn with_container(mut self, container: Arc<Container>) -> Self {
        self.container = Some(container);
        self
    }

    /// 使用指定的组件清单
    pub fn with_components(mut self, manifest: ComponentManifest) -> Self {
        self.components = Some(manifest);
        self
    }

    /// 使用指定的迁移清单
    pub fn with_migrations(mut self, manifest: MigrationManifest) -> Self {
        self.migrations = Some(manifest);
        self
    }

    /// 使用指定的数据填充器清单
    pub fn with_seeders(mut self, manifest: SeederManifest) -> Self {
        self.seeders = Some(manifest);
        self
    }

    /// 启动时是否执行迁移
    pub fn with_migrations_enabled(mut self, enabled: bool) -> Self {
        self.run_migrations = enabled;
        self
    }

    /// 启动应用
    pub async fn bootstrap(self) -> InfrastructureResult<ObsidianApplication> {
        info!("开始启动 Obsidian");

        let settings = match self.settings {
            Some(settings) => {
                settings.validate()?;
                settings
            }
            None => self.loader.load()?,
        };

        let database: Arc<dyn Database> =
            Arc::new(SqlxDatabase::connect(&settings.database).await?);
        let container = self.container.unwrap_or_default();
        container.register_instance::<dyn Database>(Arc::clone(&database));

        let migrations = self.migrations.unwrap_or_else(global_migration_manifest);
        let seeders = self.seeders.unwrap_or_else(global_seeder_manifest);
        let components = self.components.unwrap_or_else(global_component_manifest);

        let started = start(
            &settings,
            &container,
            &database,
            &migrations,
            &seeders,
            components,
            self.run_migrations,
        )
        .await;

        if let Err(failure) = started {
            error!("启动失败: {}", failure);
            database.close().await;
            return Err(failure);
        }

        info!("Obsidian 启动完成");
        Ok(ObsidianApplication {
            container,
            database,
            settings,
            migrations,
        })
    }
}

impl Default for ObsidianBootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

async fn start(
    settings: &ObsidianSettings,
    container: &Arc<Container>,
    database: &Arc<dyn Database>,
    migrations: &MigrationManifest,
    seeders: &SeederManifest,
    components: ComponentManifest,
    run_migrations: bool,
) -> InfrastructureResult<()> {
    let namespace = settings.app.base_namespace.as_str();
    let scanner = ManifestComponentScanner::with_manifest(components);
    scanner.register_namespace(container, namespace);

    if run_migrations {
        let mut manager = MigrationManager::new(Arc::clone(database));
        manager.discover_from(migrations, namespace)?;
        manager.migrate().await?;
    }

    if settings.app.run_seeders {
        SeederRunner::new(Arc::clone(container), Arc::clone(database))
            .run_from(seeders, namespace)
            .await?;
    }

    let loaded = scanner.scan_namespace(container, namespace)?;
    if loaded == 0 {
        info!("命名空间 '{}' 中没有组件", namespace);
    }
    Ok(())
}
