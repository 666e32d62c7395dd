//! 迁移中可用的表结构操作

use crate::blueprint::Blueprint;
use data_abstractions::{Connection, Dialect, SqlValue};
use infrastructure_common::MigrationResult;
use tracing::{info, warn};

/// 表结构操作
///
/// 包装迁移批次当前使用的连接（通常是事务）, 所有语句都在这个连接上执行。
pub struct Schema<'c> {
    connection: &'c mut dyn Connection,
    dialect: Dialect,
}

impl<'c> Schema<'c> {
    /// 在连接上创建表结构操作
    pub fn new(connection: &'c mut dyn Connection) -> Self {
        let dialect = connection.dialect();
        Self {
            connection,
            dialect,
        }
    }

    /// 数据库类型
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 创建数据表（已存在时不做任何事）
    pub async fn create_table<F>(&mut self, table: &str, build: F) -> MigrationResult<()>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        let mut blueprint = Blueprint::new(self.dialect);
        build(&mut blueprint);

        let sql = format!("CREATE TABLE IF NOT EXISTS {table} ({})", blueprint.to_sql());
        self.connection.execute(&sql, &[]).await?;
        info!("数据表已创建: {}", table);
        Ok(())
    }

    /// 删除数据表（不存在时不做任何事）
    pub async fn drop_table(&mut self, table: &str) -> MigrationResult<()> {
        let sql = format!("DROP TABLE IF EXISTS {table}");
        self.connection.execute(&sql, &[]).await?;
        info!("数据表已删除: {}", table);
        Ok(())
    }

    /// 添加列, `definition` 为原样写入的列类型和约束
    pub async fn add_column(
        &mut self,
        table: &str,
        column: &str,
        definition: &str,
    ) -> MigrationResult<()> {
        let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {definition}");
        self.connection.execute(&sql, &[]).await?;
        info!("列已添加: {}.{}", table, column);
        Ok(())
    }

    /// 删除列
    ///
    /// SQLite 不支持删除列, 此时只记录警告, 不执行任何语句。
    pub async fn drop_column(&mut self, table: &str, column: &str) -> MigrationResult<()> {
        if !self.dialect.supports_drop_column() {
            warn!("SQLite 不支持 DROP COLUMN, 已跳过: {}.{}", table, column);
            return Ok(());
        }

        let sql = format!("ALTER TABLE {table} DROP COLUMN {column}");
        self.connection.execute(&sql, &[]).await?;
        info!("列已删除: {}.{}", table, column);
        Ok(())
    }

    /// 数据表是否存在
    pub async fn table_exists(&mut self, table: &str) -> MigrationResult<bool> {
        let sql = match self.dialect {
            Dialect::MySql => {
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ?"
            }
            Dialect::PostgreSql => {
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?"
            }
            Dialect::Sqlite => "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
        };

        let count = self
            .connection
            .query_scalar(sql, &[SqlValue::from(table)])
            .await?
            .and_then(|value| value.as_i64())
            .unwrap_or(0);
        Ok(count > 0)
    }

    /// 执行任意语句
    pub async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> MigrationResult<u64> {
        Ok(self.connection.execute(sql, params).await?)
    }

    /// 执行标量查询
    pub async fn query_scalar(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> MigrationResult<Option<SqlValue>> {
        Ok(self.connection.query_scalar(sql, params).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use infrastructure_common::DatabaseResult;

    /// 只记录语句的连接
    pub(crate) struct RecordingConnection {
        pub dialect: Dialect,
        pub statements: Vec<String>,
        pub scalar: Option<SqlValue>,
    }

    impl RecordingConnection {
        pub(crate) fn new(dialect: Dialect) -> Self {
            Self {
                dialect,
                statements: Vec::new(),
                scalar: None,
            }
        }
    }

    #[async_trait]
    impl Connection for RecordingConnection {
        fn dialect(&self) -> Dialect {
            self.dialect
        }

        async fn execute(&mut self, sql: &str, _params: &[SqlValue]) -> DatabaseResult<u64> {
            self.statements.push(sql.to_string());
            Ok(0)
        }

        async fn query_scalar(
            &mut self,
            sql: &str,
            _params: &[SqlValue],
        ) -> DatabaseResult<Option<SqlValue>> {
            self.statements.push(sql.to_string());
            Ok(self.scalar.clone())
        }
    }

    #[tokio::test]
    async fn test_create_table_statement() {
        let mut connection = RecordingConnection::new(Dialect::PostgreSql);
        let mut schema = Schema::new(&mut connection);
        schema
            .create_table("users", |table| {
                table.id().string("name").not_null();
            })
            .await
            .unwrap();

        assert_eq!(
            connection.statements,
            ["CREATE TABLE IF NOT EXISTS users (id SERIAL PRIMARY KEY, name VARCHAR(255) NOT NULL)"]
        );
    }

    #[tokio::test]
    async fn test_drop_column_is_skipped_on_sqlite() {
        let mut connection = RecordingConnection::new(Dialect::Sqlite);
        Schema::new(&mut connection)
            .drop_column("users", "nickname")
            .await
            .unwrap();
        assert!(connection.statements.is_empty());
    }

    #[tokio::test]
    async fn test_drop_column_on_mysql() {
        let mut connection = RecordingConnection::new(Dialect::MySql);
        let mut schema = Schema::new(&mut connection);
        schema.add_column("users", "age", "INT DEFAULT 0").await.unwrap();
        schema.drop_column("users", "age").await.unwrap();
        schema.drop_table("users").await.unwrap();

        assert_eq!(
            connection.statements,
            [
                "ALTER TABLE users ADD COLUMN age INT DEFAULT 0",
                "ALTER TABLE users DROP COLUMN age",
                "DROP TABLE IF EXISTS users",
            ]
        );
    }

    #[tokio::test]
    async fn test_table_exists_reads_count() {
        let mut connection = RecordingConnection::new(Dialect::MySql);
        connection.scalar = Some(SqlValue::Integer(1));
        assert!(Schema::new(&mut connection).table_exists("users").await.unwrap());
        assert!(connection.statements[0].contains("information_schema.tables"));

        let mut missing = RecordingConnection::new(Dialect::Sqlite);
        assert!(!Schema::new(&mut missing).table_exists("users").await.unwrap());
        assert!(missing.statements[0].contains("sqlite_master"));
    }
}
