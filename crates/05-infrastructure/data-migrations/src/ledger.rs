//! 迁移记录表

use crate::schema::Schema;
use data_abstractions::{Connection, SqlValue};
use infrastructure_common::MigrationResult;
use tracing::debug;

/// 迁移记录表操作
///
/// 表中每一行对应一个已执行的迁移标识。
pub struct MigrationLedger;

impl MigrationLedger {
    /// 记录表名
    pub const TABLE: &'static str = "migrations";

    /// 创建记录表（已存在时不做任何事）
    pub async fn ensure(connection: &mut dyn Connection) -> MigrationResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (id {}, migration VARCHAR(255) NOT NULL, executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)",
            Self::TABLE,
            connection.dialect().auto_increment_primary_key()
        );
        connection.execute(&sql, &[]).await?;
        Ok(())
    }

    /// 记录表是否存在
    pub async fn exists(connection: &mut dyn Connection) -> MigrationResult<bool> {
        Schema::new(connection).table_exists(Self::TABLE).await
    }

    /// 迁移是否已执行
    pub async fn is_applied(connection: &mut dyn Connection, id: &str) -> MigrationResult<bool> {
        let count = connection
            .query_scalar(
                "SELECT COUNT(*) FROM migrations WHERE migration = ?",
                &[SqlValue::from(id)],
            )
            .await?
            .and_then(|value| value.as_i64())
            .unwrap_or(0);
        Ok(count > 0)
    }

    /// 记录已执行的迁移
    pub async fn record(connection: &mut dyn Connection, id: &str) -> MigrationResult<()> {
        connection
            .execute(
                "INSERT INTO migrations (migration) VALUES (?)",
                &[SqlValue::from(id)],
            )
            .await?;
        debug!("迁移已记录: {}", id);
        Ok(())
    }

    /// 删除迁移记录
    pub async fn forget(connection: &mut dyn Connection, id: &str) -> MigrationResult<()> {
        connection
            .execute(
                "DELETE FROM migrations WHERE migration = ?",
                &[SqlValue::from(id)],
            )
            .await?;
        debug!("迁移记录已删除: {}", id);
        Ok(())
    }
}
