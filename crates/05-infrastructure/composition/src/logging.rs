//! 日志初始化

use infrastructure_common::{InfrastructureError, InfrastructureResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志过滤指令, 例如 `info` 或 `data_migrations=debug`; 设置了 `RUST_LOG` 时以其为准
    pub level: String,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示文件名和行号
    pub show_file: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: true,
            show_file: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            show_target: true,
            show_file: true,
            json_format: false,
        }
    }

    /// 生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            show_target: false,
            show_file: false,
            json_format: true,
        }
    }

    /// 设置过滤指令
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// 构建过滤器
    pub fn filter(&self) -> InfrastructureResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level).map_err(|error| InfrastructureError::BootstrapFailed {
            message: format!("无效的日志级别 '{}': {}", self.level, error),
        })
    }

    /// 安装全局日志订阅者
    pub fn init(&self) -> InfrastructureResult<()> {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(self.filter()?)
            .with_target(self.show_target)
            .with_file(self.show_file)
            .with_line_number(self.show_file);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|error| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", error),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
