//! # 基础设施组合层
//!
//! 把配置、数据库、迁移、数据填充和依赖注入组合成一个可运行的应用。
//!
//! ## 主要功能
//!
//! - **配置加载**: 默认值、`obsidian.toml` 和 `DB_*` 环境变量
//! - **组件扫描**: 按命名空间读取组件清单并构造所有组件
//! - **启动编排**: 配置 → 数据库 → 迁移 → 数据填充 → 组件扫描
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::ObsidianBootstrapper;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let application = ObsidianBootstrapper::new().bootstrap().await?;
//!
//!     for component in application.container().registered_components() {
//!         println!("{}", component.name());
//!     }
//!
//!     application.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod bootstrapper;
pub mod component_scanner;
pub mod logging;
pub mod settings;

pub use bootstrapper::{ObsidianApplication, ObsidianBootstrapper};
pub use component_scanner::ManifestComponentScanner;
pub use logging::LoggingConfig;
pub use settings::{AppSettings, ObsidianSettings, SettingsLoader};

// 重新导出错误类型
pub use infrastructure_common::{InfrastructureError, InfrastructureResult};
