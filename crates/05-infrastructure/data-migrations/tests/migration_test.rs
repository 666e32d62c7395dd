//! 迁移管理器在 SQLite 内存数据库上的集成测试

use async_trait::async_trait;
use data_abstractions::Database;
use data_migrations::{
    Migration, MigrationError, MigrationManager, MigrationManifest, MigrationResult,
    MigrationState, Schema,
};
use data_sqlx::SqlxDatabase;
use parking_lot::Mutex;
use std::sync::Arc;

type CallLog = Arc<Mutex<Vec<String>>>;

struct CreateTable {
    id: &'static str,
    table: &'static str,
    log: CallLog,
}

impl CreateTable {
    fn boxed(id: &'static str, table: &'static str, log: &CallLog) -> Box<dyn Migration> {
        Box::new(Self {
            id,
            table,
            log: Arc::clone(log),
        })
    }
}

#[async_trait]
impl Migration for CreateTable {
    fn id(&self) -> &str {
        self.id
    }

    async fn up(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        self.log.lock().push(format!("up:{}", self.id));
        schema
            .create_table(self.table, |table| {
                table.id().string("name").not_null().timestamps();
            })
            .await
    }

    async fn down(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        self.log.lock().push(format!("down:{}", self.id));
        schema.drop_table(self.table).await
    }
}

struct Broken;

#[async_trait]
impl Migration for Broken {
    fn id(&self) -> &str {
        "2024_01_03_broken"
    }

    async fn up(&self, _schema: &mut Schema<'_>) -> MigrationResult<()> {
        Err(MigrationError::custom("列定义错误"))
    }

    async fn down(&self, _schema: &mut Schema<'_>) -> MigrationResult<()> {
        Ok(())
    }
}

struct AddNickname;

#[async_trait]
impl Migration for AddNickname {
    fn id(&self) -> &str {
        "2024_01_02_add_nickname"
    }

    async fn up(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema.add_column("users", "nickname", "TEXT").await
    }

    async fn down(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema.drop_column("users", "nickname").await
    }
}

async fn database() -> Arc<dyn Database> {
    Arc::new(SqlxDatabase::in_memory().await.unwrap())
}

async fn ledger_rows(database: &Arc<dyn Database>) -> i64 {
    let mut connection = database.connection().await.unwrap();
    connection
        .query_scalar("SELECT COUNT(*) FROM migrations", &[])
        .await
        .unwrap()
        .and_then(|value| value.as_i64())
        .unwrap_or(0)
}

async fn table_exists(database: &Arc<dyn Database>, table: &str) -> bool {
    let mut connection = database.connection().await.unwrap();
    Schema::new(connection.as_mut())
        .table_exists(table)
        .await
        .unwrap()
}

fn three_tables(database: &Arc<dyn Database>, log: &CallLog) -> MigrationManager {
    let mut manager = MigrationManager::new(Arc::clone(database));
    manager
        .add(CreateTable::boxed("2024_01_01_create_users", "users", log))
        .unwrap()
        .add(CreateTable::boxed("2024_01_02_create_orders", "orders", log))
        .unwrap()
        .add(CreateTable::boxed("2024_01_03_create_items", "items", log))
        .unwrap();
    manager
}

#[tokio::test]
async fn test_migrate_twice_applies_each_migration_once() {
    let database = database().await;
    let log = CallLog::default();
    let manager = three_tables(&database, &log);

    let first = manager.migrate().await.unwrap();
    assert_eq!(first.applied.len(), 3);
    assert!(first.skipped.is_empty());

    let second = manager.migrate().await.unwrap();
    assert!(second.applied.is_empty());
    assert_eq!(second.skipped.len(), 3);

    assert_eq!(log.lock().len(), 3);
    assert_eq!(ledger_rows(&database).await, 3);
    assert!(table_exists(&database, "orders").await);
}

#[tokio::test]
async fn test_failed_migration_rolls_back_whole_batch() {
    let database = database().await;
    let log = CallLog::default();
    let mut manager = MigrationManager::new(Arc::clone(&database));
    manager
        .add(CreateTable::boxed("2024_01_01_create_users", "users", &log))
        .unwrap()
        .add(CreateTable::boxed("2024_01_02_create_orders", "orders", &log))
        .unwrap()
        .add(Box::new(Broken))
        .unwrap()
        .add(CreateTable::boxed("2024_01_04_create_items", "items", &log))
        .unwrap()
        .add(CreateTable::boxed("2024_01_05_create_tags", "tags", &log))
        .unwrap();

    let error = manager.migrate().await.unwrap_err();
    match error {
        MigrationError::MigrationFailed { migration, .. } => {
            assert_eq!(migration, "2024_01_03_broken");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(
        *log.lock(),
        ["up:2024_01_01_create_users", "up:2024_01_02_create_orders"]
    );
    assert!(!table_exists(&database, "users").await);
    assert!(!table_exists(&database, "orders").await);
    assert!(!table_exists(&database, "migrations").await);

    let statuses = manager.status().await.unwrap();
    assert_eq!(statuses.len(), 5);
    assert!(statuses
        .iter()
        .all(|status| status.state == MigrationState::Pending));
}

#[tokio::test]
async fn test_rollback_reverts_in_reverse_order() {
    let database = database().await;
    let log = CallLog::default();
    let manager = three_tables(&database, &log);

    manager.migrate().await.unwrap();
    log.lock().clear();

    let report = manager.rollback().await.unwrap();
    assert_eq!(
        report.reverted,
        [
            "2024_01_03_create_items",
            "2024_01_02_create_orders",
            "2024_01_01_create_users",
        ]
    );
    assert_eq!(
        *log.lock(),
        [
            "down:2024_01_03_create_items",
            "down:2024_01_02_create_orders",
            "down:2024_01_01_create_users",
        ]
    );
    assert_eq!(ledger_rows(&database).await, 0);
    assert!(!table_exists(&database, "users").await);
}

#[tokio::test]
async fn test_fresh_restores_ledger() {
    let database = database().await;
    let log = CallLog::default();
    let manager = three_tables(&database, &log);

    manager.migrate().await.unwrap();
    let report = manager.fresh().await.unwrap();

    assert_eq!(report.reverted.len(), 3);
    assert_eq!(report.applied.len(), 3);
    assert_eq!(ledger_rows(&database).await, 3);
    assert!(table_exists(&database, "items").await);
}

#[tokio::test]
async fn test_rollback_last_reverts_only_latest() {
    let database = database().await;
    let log = CallLog::default();
    let manager = three_tables(&database, &log);

    manager.migrate().await.unwrap();
    let report = manager.rollback_last().await.unwrap();
    assert_eq!(report.reverted, ["2024_01_03_create_items"]);

    let states: Vec<_> = manager
        .status()
        .await
        .unwrap()
        .into_iter()
        .map(|status| status.state)
        .collect();
    assert_eq!(
        states,
        [
            MigrationState::Applied,
            MigrationState::Applied,
            MigrationState::Pending,
        ]
    );
    assert!(table_exists(&database, "orders").await);
    assert!(!table_exists(&database, "items").await);
}

#[tokio::test]
async fn test_status_does_not_create_ledger() {
    let database = database().await;
    let log = CallLog::default();
    let manager = three_tables(&database, &log);

    let statuses = manager.status().await.unwrap();
    assert_eq!(statuses[0].id, "2024_01_01_create_users");
    assert!(statuses
        .iter()
        .all(|status| status.state == MigrationState::Pending));
    assert!(!table_exists(&database, "migrations").await);
}

#[tokio::test]
async fn test_rollback_on_fresh_database_does_not_create_ledger() {
    let database = database().await;
    let log = CallLog::default();
    let manager = three_tables(&database, &log);

    assert!(manager.rollback_last().await.unwrap().reverted.is_empty());
    assert!(manager.rollback().await.unwrap().reverted.is_empty());
    assert!(log.lock().is_empty());
    assert!(!table_exists(&database, "migrations").await);
}

#[tokio::test]
async fn test_drop_column_is_skipped_on_sqlite() {
    let database = database().await;
    let log = CallLog::default();
    let mut manager = MigrationManager::new(Arc::clone(&database));
    manager
        .add(CreateTable::boxed("2024_01_01_create_users", "users", &log))
        .unwrap()
        .add(Box::new(AddNickname))
        .unwrap();

    manager.migrate().await.unwrap();
    let report = manager.rollback_last().await.unwrap();

    assert_eq!(report.reverted, ["2024_01_02_add_nickname"]);
    assert_eq!(ledger_rows(&database).await, 1);
}

fn create_users() -> Box<dyn Migration> {
    CreateTable::boxed("2024_01_01_create_users", "users", &CallLog::default())
}

fn create_posts() -> Box<dyn Migration> {
    CreateTable::boxed("2024_01_01_create_posts", "posts", &CallLog::default())
}

#[tokio::test]
async fn test_discover_from_manifest_by_namespace() {
    let database = database().await;
    let manifest = MigrationManifest::new()
        .with("shop::migrations", create_users)
        .with("blog::migrations", create_posts);

    let mut manager = MigrationManager::new(Arc::clone(&database));
    manager.discover_from(&manifest, "shop").unwrap();
    assert_eq!(manager.migration_ids(), ["2024_01_01_create_users"]);

    let error = manager.discover_from(&manifest, "").unwrap_err();
    assert!(matches!(error, MigrationError::DuplicateIdentity { .. }));
}
