//! 应用配置加载
//!
//! 加载顺序（后者覆盖前者）:
//! 1. 内置默认值
//! 2. 配置文件（默认 `obsidian.toml`, 不存在时跳过）
//! 3. 环境变量 `DB_*` 和 `OBSIDIAN_*`（`.env` 文件会先被加载到进程环境）

use config::{Config, ConfigBuilder, Environment, File, Map, Source};
use data_abstractions::{DatabaseSettings, Dialect};
use infrastructure_common::{ConfigError, ConfigResult, InfrastructureResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// 数据库配置可由环境变量覆盖的字段
const DATABASE_KEYS: [&str; 7] = ["type", "path", "host", "port", "name", "user", "password"];

/// 应用配置可由环境变量覆盖的字段
const APP_KEYS: [&str; 2] = ["base_namespace", "run_seeders"];

/// 应用行为配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 组件、迁移和数据填充器所在的命名空间根, 空字符串表示全部
    pub base_namespace: String,
    /// 启动时是否执行数据填充
    pub run_seeders: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_namespace: String::new(),
            run_seeders: true,
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObsidianSettings {
    /// 应用配置
    pub app: AppSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
}

impl ObsidianSettings {
    /// 使用 SQLite 内存数据库的配置
    pub fn in_memory(base_namespace: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                base_namespace: base_namespace.into(),
                ..AppSettings::default()
            },
            database: DatabaseSettings::sqlite_in_memory(),
        }
    }

    /// 校验配置
    ///
    /// 未知的数据库类型以 `DatabaseError::UnsupportedDialect` 返回。
    pub fn validate(&self) -> InfrastructureResult<()> {
        let dialect = self.database.dialect()?;

        let outcome: ConfigResult<()> = match dialect {
            Dialect::Sqlite if self.database.path.trim().is_empty() => {
                Err(ConfigError::ValidationError {
                    message: "SQLite 需要设置 DB_PATH".to_string(),
                })
            }
            Dialect::MySql | Dialect::PostgreSql
                if self.database.name.as_deref().map_or(true, str::is_empty) =>
            {
                Err(ConfigError::ValidationError {
                    message: format!("{dialect} 需要设置 DB_NAME"),
                })
            }
            _ => Ok(()),
        };
        outcome.map_err(Into::into)
    }
}

/// 配置加载器
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file: PathBuf,
    file_required: bool,
    load_dotenv: bool,
    database_prefix: String,
    app_prefix: String,
    environment: Option<Map<String, String>>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self {
            file: PathBuf::from("obsidian.toml"),
            file_required: false,
            load_dotenv: true,
            database_prefix: "DB".to_string(),
            app_prefix: "OBSIDIAN".to_string(),
            environment: None,
        }
    }
}

impl SettingsLoader {
    /// 创建使用默认来源的加载器
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定的配置文件, 文件必须存在
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = path.as_ref().to_path_buf();
        self.file_required = true;
        self
    }

    /// 是否加载 `.env` 文件
    pub fn with_dotenv(mut self, enabled: bool) -> Self {
        self.load_dotenv = enabled;
        self
    }

    /// 使用给定的变量代替进程环境变量
    pub fn with_environment<K, V>(mut self, variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = Some(
            variables
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// 加载并校验配置
    pub fn load(&self) -> InfrastructureResult<ObsidianSettings> {
        if self.load_dotenv {
            match dotenvy::dotenv() {
                Ok(path) => debug!("已加载环境文件: {}", path.display()),
                Err(error) => debug!("未加载 .env 文件: {}", error),
            }
        }

        if self.file_required && !self.file.exists() {
            return Err(ConfigError::FileNotFound {
                path: self.file.display().to_string(),
            }
            .into());
        }

        let mut builder = Config::builder()
            .add_source(File::from(self.file.as_path()).required(self.file_required));
        builder = self.overlay(builder, &self.database_prefix, "database", &DATABASE_KEYS)?;
        builder = self.overlay(builder, &self.app_prefix, "app", &APP_KEYS)?;

        let settings: ObsidianSettings = builder
            .build()
            .and_then(|config| config.try_deserialize::<ObsidianSettings>())
            .map_err(|error| {
                error!("配置加载失败: {}", error);
                ConfigError::ParseError {
                    source: Box::new(error),
                }
            })?;

        settings.validate()?;
        info!(
            "配置加载完成: 数据库 {}, 命名空间 '{}'",
            settings.database.db_type, settings.app.base_namespace
        );
        Ok(settings)
    }

    /// 把 `<PREFIX>_<KEY>` 环境变量覆盖到 `<section>.<key>`
    fn overlay(
        &self,
        mut builder: ConfigBuilder<config::builder::DefaultState>,
        prefix: &str,
        section: &str,
        keys: &[&str],
    ) -> ConfigResult<ConfigBuilder<config::builder::DefaultState>> {
        let variables = Environment::with_prefix(prefix)
            .source(self.environment.clone())
            .collect()
            .map_err(|error| ConfigError::ParseError {
                source: Box::new(error),
            })?;

        for (key, value) in variables {
            if !keys.contains(&key.as_str()) {
                continue;
            }
            debug!("环境变量覆盖配置: {}.{}", section, key);
            builder = builder
                .set_override(format!("{section}.{key}"), value)
                .map_err(|error| ConfigError::ParseError {
                    source: Box::new(error),
                })?;
        }
        Ok(builder)
    }
}
