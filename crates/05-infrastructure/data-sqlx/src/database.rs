//! 数据库连接池

use crate::connection::{SqlxConnection, SqlxTransaction};
use crate::options::{connection_url, redacted};
use async_trait::async_trait;
use data_abstractions::{Connection, Database, DatabaseSettings, Dialect, Transaction};
use infrastructure_common::{DatabaseError, DatabaseResult};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;
use tracing::{debug, info};

/// 连接池配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// 最大连接数
    pub max_connections: u32,
    /// 最小空闲连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout: u64,
    /// 空闲连接回收时间（秒）, `None` 表示不回收
    pub idle_timeout: Option<u64>,
    /// 连接最长存活时间（秒）, `None` 表示不限制
    pub max_lifetime: Option<u64>,
}

impl PoolSettings {
    /// 按数据库类型选择默认配置
    ///
    /// 网络数据库: 最多 20 个连接, 至少保持 5 个空闲连接。
    /// SQLite: 最多 5 个连接且始终保留一个不回收的连接, 共享缓存的内存数据库因此在连接池关闭前一直存在。
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Sqlite => Self {
                max_connections: 5,
                min_connections: 1,
                acquire_timeout: 30,
                idle_timeout: None,
                max_lifetime: None,
            },
            Dialect::MySql | Dialect::PostgreSql => Self {
                max_connections: 20,
                min_connections: 5,
                acquire_timeout: 30,
                idle_timeout: Some(600),
                max_lifetime: Some(1800),
            },
        }
    }
}

/// 基于 sqlx 连接池的数据库
#[derive(Debug, Clone)]
pub struct SqlxDatabase {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlxDatabase {
    /// 按配置连接数据库
    pub async fn connect(settings: &DatabaseSettings) -> DatabaseResult<Self> {
        let dialect = settings.dialect()?;
        let url = connection_url(settings)?;
        info!("连接数据库: {} ({})", dialect, redacted(&url));
        Self::connect_with(url.as_str(), dialect, &PoolSettings::for_dialect(dialect)).await
    }

    /// 按 URL 和连接池配置连接数据库
    pub async fn connect_with(
        url: &str,
        dialect: Dialect,
        pool_settings: &PoolSettings,
    ) -> DatabaseResult<Self> {
        sqlx::any::install_default_drivers();

        let options = AnyPoolOptions::new()
            .max_connections(pool_settings.max_connections)
            .min_connections(pool_settings.min_connections)
            .acquire_timeout(Duration::from_secs(pool_settings.acquire_timeout))
            .idle_timeout(pool_settings.idle_timeout.map(Duration::from_secs))
            .max_lifetime(pool_settings.max_lifetime.map(Duration::from_secs));

        let pool = options
            .connect(url)
            .await
            .map_err(|error| DatabaseError::ConnectionFailed {
                message: error.to_string(),
            })?;

        debug!("数据库连接池已创建: {}", dialect);
        Ok(Self { pool, dialect })
    }

    /// SQLite 内存数据库
    pub async fn in_memory() -> DatabaseResult<Self> {
        Self::connect(&DatabaseSettings::sqlite_in_memory()).await
    }

    /// 底层连接池
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl Database for SqlxDatabase {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn connection(&self) -> DatabaseResult<Box<dyn Connection>> {
        let connection =
            self.pool
                .acquire()
                .await
                .map_err(|error| DatabaseError::ConnectionFailed {
                    message: error.to_string(),
                })?;
        Ok(Box::new(SqlxConnection::new(connection, self.dialect)))
    }

    async fn begin(&self) -> DatabaseResult<Box<dyn Transaction>> {
        let transaction =
            self.pool
                .begin()
                .await
                .map_err(|error| DatabaseError::TransactionFailed {
                    message: error.to_string(),
                })?;
        Ok(Box::new(SqlxTransaction::new(transaction, self.dialect)))
    }

    async fn close(&self) {
        info!("关闭数据库连接池");
        self.pool.close().await;
    }
}
