//! 迁移管理器
//!
//! 每次 `migrate` / `rollback` / `rollback_last` 调用都在一个事务中完成,
//! 任一迁移失败时整批回滚。

use crate::ledger::MigrationLedger;
use crate::migration::{global_migration_manifest, Migration, MigrationManifest};
use crate::schema::Schema;
use chrono::{DateTime, Utc};
use data_abstractions::{Connection, Database, Transaction};
use infrastructure_common::{MigrationError, MigrationResult};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 迁移状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    /// 已执行
    Applied,
    /// 待执行
    Pending,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Applied => f.write_str("applied"),
            MigrationState::Pending => f.write_str("pending"),
        }
    }
}

/// 单个迁移的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// 迁移标识
    pub id: String,
    /// 状态
    pub state: MigrationState,
}

/// 一次迁移操作的结果
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// 本次执行的迁移
    pub applied: Vec<String>,
    /// 本次撤销的迁移
    pub reverted: Vec<String>,
    /// 已执行而跳过的迁移
    pub skipped: Vec<String>,
    /// 完成时间
    pub completed_at: DateTime<Utc>,
}

impl MigrationReport {
    fn new() -> Self {
        Self {
            applied: Vec::new(),
            reverted: Vec::new(),
            skipped: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    fn completed(mut self) -> Self {
        self.completed_at = Utc::now();
        self
    }

    /// 是否没有任何变更
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.reverted.is_empty()
    }
}

/// 迁移管理器
///
/// 按标识的字典序保存迁移, 同一标识只能出现一次。
pub struct MigrationManager {
    database: Arc<dyn Database>,
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationManager {
    /// 创建迁移管理器
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self {
            database,
            migrations: Vec::new(),
        }
    }

    /// 添加迁移
    pub fn add(&mut self, migration: Box<dyn Migration>) -> MigrationResult<&mut Self> {
        let id = migration.id();
        if self.migrations.iter().any(|existing| existing.id() == id) {
            return Err(MigrationError::DuplicateIdentity { id: id.to_string() });
        }

        let position = self
            .migrations
            .partition_point(|existing| existing.id() < id);
        debug!("添加迁移: {}", id);
        self.migrations.insert(position, migration);
        Ok(self)
    }

    /// 从全局迁移清单发现命名空间内的迁移
    pub fn discover(&mut self, namespace: &str) -> MigrationResult<&mut Self> {
        self.discover_from(&global_migration_manifest(), namespace)
    }

    /// 从指定清单发现命名空间内的迁移
    pub fn discover_from(
        &mut self,
        manifest: &MigrationManifest,
        namespace: &str,
    ) -> MigrationResult<&mut Self> {
        let registrations = manifest.migrations_in(namespace);
        for registration in &registrations {
            self.add(registration.instantiate())?;
        }
        info!("发现 {} 个迁移 (命名空间: {})", registrations.len(), namespace);
        Ok(self)
    }

    /// 按执行顺序排列的迁移标识
    pub fn migration_ids(&self) -> Vec<&str> {
        self.migrations.iter().map(|migration| migration.id()).collect()
    }

    /// 迁移数量
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// 是否没有迁移
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// 执行所有待执行的迁移
    pub async fn migrate(&self) -> MigrationResult<MigrationReport> {
        info!("开始执行迁移");
        let mut transaction = self.database.begin().await?;
        let result = self.apply_pending(transaction.as_connection()).await;
        let report = finish(transaction, result).await?;
        info!(
            "迁移完成: 执行 {} 个, 跳过 {} 个",
            report.applied.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// 按逆序撤销所有已执行的迁移
    pub async fn rollback(&self) -> MigrationResult<MigrationReport> {
        info!("开始回滚所有迁移");
        let mut transaction = self.database.begin().await?;
        let result = self.revert_applied(transaction.as_connection(), None).await;
        let report = finish(transaction, result).await?;
        info!("回滚完成: 撤销 {} 个", report.reverted.len());
        Ok(report)
    }

    /// 只撤销最近执行的一个迁移
    pub async fn rollback_last(&self) -> MigrationResult<MigrationReport> {
        info!("开始回滚最近一个迁移");
        let mut transaction = self.database.begin().await?;
        let result = self.revert_applied(transaction.as_connection(), Some(1)).await;
        let report = finish(transaction, result).await?;
        if report.reverted.is_empty() {
            info!("没有可回滚的迁移");
        }
        Ok(report)
    }

    /// 撤销全部迁移后重新执行
    ///
    /// 两个阶段各自使用独立事务。
    pub async fn fresh(&self) -> MigrationResult<MigrationReport> {
        let rolled_back = self.rollback().await?;
        let mut report = self.migrate().await?;
        report.reverted = rolled_back.reverted;
        Ok(report)
    }

    /// 查询每个迁移的执行状态, 不修改数据库
    pub async fn status(&self) -> MigrationResult<Vec<MigrationStatus>> {
        let mut connection = self.database.connection().await?;
        let ledger_exists = MigrationLedger::exists(connection.as_mut()).await?;

        let mut statuses = Vec::with_capacity(self.migrations.len());
        for migration in &self.migrations {
            let applied = ledger_exists
                && MigrationLedger::is_applied(connection.as_mut(), migration.id()).await?;
            statuses.push(MigrationStatus {
                id: migration.id().to_string(),
                state: if applied {
                    MigrationState::Applied
                } else {
                    MigrationState::Pending
                },
            });
        }
        Ok(statuses)
    }

    async fn apply_pending(
        &self,
        connection: &mut dyn Connection,
    ) -> MigrationResult<MigrationReport> {
        MigrationLedger::ensure(connection).await?;

        let mut report = MigrationReport::new();
        for migration in &self.migrations {
            let id = migration.id();
            if MigrationLedger::is_applied(connection, id).await? {
                debug!("迁移已执行, 跳过: {}", id);
                report.skipped.push(id.to_string());
                continue;
            }

            info!("执行迁移: {}", id);
            let mut schema = Schema::new(connection);
            migration
                .up(&mut schema)
                .await
                .map_err(|error| MigrationError::failed(id, error))?;
            MigrationLedger::record(connection, id)
                .await
                .map_err(|error| MigrationError::failed(id, error))?;
            report.applied.push(id.to_string());
        }
        Ok(report.completed())
    }

    async fn revert_applied(
        &self,
        connection: &mut dyn Connection,
        limit: Option<usize>,
    ) -> MigrationResult<MigrationReport> {
        if !MigrationLedger::exists(connection).await? {
            debug!("迁移记录表不存在, 没有可撤销的迁移");
            return Ok(MigrationReport::new().completed());
        }

        let mut report = MigrationReport::new();
        for migration in self.migrations.iter().rev() {
            if limit.is_some_and(|limit| report.reverted.len() >= limit) {
                break;
            }

            let id = migration.id();
            if !MigrationLedger::is_applied(connection, id).await? {
                continue;
            }

            info!("撤销迁移: {}", id);
            let mut schema = Schema::new(connection);
            migration
                .down(&mut schema)
                .await
                .map_err(|error| MigrationError::failed(id, error))?;
            MigrationLedger::forget(connection, id)
                .await
                .map_err(|error| MigrationError::failed(id, error))?;
            report.reverted.push(id.to_string());
        }
        Ok(report.completed())
    }
}

impl fmt::Debug for MigrationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationManager")
            .field("dialect", &self.database.dialect())
            .field("migrations", &self.migration_ids())
            .finish()
    }
}

/// 成功时提交事务, 失败时回滚并返回原始错误
async fn finish(
    transaction: Box<dyn Transaction>,
    result: MigrationResult<MigrationReport>,
) -> MigrationResult<MigrationReport> {
    match result {
        Ok(report) => {
            transaction.commit().await?;
            Ok(report)
        }
        Err(failure) => {
            error!("迁移失败, 回滚事务: {}", failure);
            if let Err(rollback_error) = transaction.rollback().await {
                warn!("事务回滚失败: {}", rollback_error);
            }
            Err(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl Migration for Named {
        fn id(&self) -> &str {
            self.0
        }

        async fn up(&self, _schema: &mut Schema<'_>) -> MigrationResult<()> {
            Ok(())
        }

        async fn down(&self, _schema: &mut Schema<'_>) -> MigrationResult<()> {
            Ok(())
        }
    }

    struct NoDatabase;

    #[async_trait]
    impl Database for NoDatabase {
        fn dialect(&self) -> data_abstractions::Dialect {
            data_abstractions::Dialect::Sqlite
        }

        async fn connection(
            &self,
        ) -> infrastructure_common::DatabaseResult<Box<dyn Connection>> {
            Err(infrastructure_common::DatabaseError::ConnectionFailed {
                message: "offline".to_string(),
            })
        }

        async fn begin(&self) -> infrastructure_common::DatabaseResult<Box<dyn Transaction>> {
            Err(infrastructure_common::DatabaseError::ConnectionFailed {
                message: "offline".to_string(),
            })
        }

        async fn close(&self) {}
    }

    fn manager() -> MigrationManager {
        MigrationManager::new(Arc::new(NoDatabase))
    }

    #[test]
    fn test_migrations_are_ordered_by_identity() {
        let mut manager = manager();
        manager
            .add(Box::new(Named("2024_03_01_c")))
            .unwrap()
            .add(Box::new(Named("2024_01_01_a")))
            .unwrap()
            .add(Box::new(Named("2024_02_01_b")))
            .unwrap();

        assert_eq!(
            manager.migration_ids(),
            ["2024_01_01_a", "2024_02_01_b", "2024_03_01_c"]
        );
    }

    #[test]
    fn test_duplicate_identity_is_rejected() {
        let mut manager = manager();
        manager.add(Box::new(Named("2024_01_01_a"))).unwrap();

        let error = manager.add(Box::new(Named("2024_01_01_a"))).unwrap_err();
        assert!(matches!(error, MigrationError::DuplicateIdentity { id } if id == "2024_01_01_a"));
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_is_reported() {
        let mut manager = manager();
        manager.add(Box::new(Named("2024_01_01_a"))).unwrap();

        let error = manager.migrate().await.unwrap_err();
        assert!(matches!(error, MigrationError::Database { .. }));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(MigrationState::Applied.to_string(), "applied");
        assert_eq!(
            serde_json::to_string(&MigrationState::Pending).unwrap(),
            "\"pending\""
        );
    }
}
