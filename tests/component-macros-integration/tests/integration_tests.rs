//! 注册宏与启动流程的端到端测试

use async_trait::async_trait;
use component_macros::{migration, repository, seeder, service};
use data_abstractions::{Connection, Database, DatabaseResult, SqlValue};
use data_migrations::{Migration, MigrationResult, MigrationState, Schema, SeedResult, Seeder};
use di_abstractions::Inject;
use infrastructure_composition::{LoggingConfig, ObsidianBootstrapper, ObsidianSettings};
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        LoggingConfig::development().init().ok();
    });
}

/// 笔记仓储
#[repository]
pub struct NoteRepository {
    database: Arc<dyn Database>,
}

impl NoteRepository {
    async fn scalar(&self, sql: &str) -> DatabaseResult<Option<SqlValue>> {
        let mut connection = self.database.connection().await?;
        connection.query_scalar(sql, &[]).await
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        let count = self.scalar("SELECT COUNT(*) FROM notes").await?;
        Ok(count.and_then(|value| value.as_i64()).unwrap_or(0))
    }

    pub async fn last_title(&self) -> DatabaseResult<Option<String>> {
        let title = self
            .scalar("SELECT title FROM notes ORDER BY id DESC LIMIT 1")
            .await?;
        Ok(title.and_then(|value| value.as_str().map(str::to_string)))
    }
}

/// 笔记服务
#[service]
pub struct NoteService {
    notes: Arc<NoteRepository>,
}

#[migration]
pub struct CreateNotes;

#[async_trait]
impl Migration for CreateNotes {
    fn id(&self) -> &str {
        "2024_03_01_000001_create_notes"
    }

    async fn up(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema
            .create_table("notes", |table| {
                table.id().string("title").not_null().timestamps();
            })
            .await
    }

    async fn down(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema.drop_table("notes").await
    }
}

#[seeder(priority = 1)]
pub struct FirstNote;

#[async_trait]
impl Seeder for FirstNote {
    async fn seed(&self, connection: &mut dyn Connection) -> SeedResult<()> {
        connection
            .execute(
                "INSERT INTO notes (title) VALUES (?)",
                &[SqlValue::from("first")],
            )
            .await?;
        Ok(())
    }
}

/// 依赖笔记仓储, 在 `FirstNote` 之后执行
#[seeder(priority = 2)]
pub struct SecondNote {
    notes: Inject<NoteRepository>,
}

#[async_trait]
impl Seeder for SecondNote {
    async fn seed(&self, connection: &mut dyn Connection) -> SeedResult<()> {
        let existing = connection
            .query_scalar("SELECT COUNT(*) FROM notes", &[])
            .await?
            .and_then(|value| value.as_i64())
            .unwrap_or(0);
        let source = if self.notes.is_injected() {
            "injected"
        } else {
            "missing"
        };

        connection
            .execute(
                "INSERT INTO notes (title) VALUES (?)",
                &[SqlValue::from(format!("after {} ({})", existing, source))],
            )
            .await?;
        Ok(())
    }
}

fn settings() -> ObsidianSettings {
    ObsidianSettings::in_memory(module_path!())
}

#[tokio::test]
async fn test_annotated_types_drive_startup() {
    init_test_logger();
    let application = ObsidianBootstrapper::new()
        .with_settings(settings())
        .bootstrap()
        .await
        .unwrap();

    let container = application.container();
    assert!(container.has_instance::<NoteRepository>());
    assert!(container.has_instance::<NoteService>());

    let service = container.resolve::<NoteService>().unwrap();
    assert!(Arc::ptr_eq(
        &service.notes,
        &container.resolve::<NoteRepository>().unwrap()
    ));

    let notes = container.resolve::<NoteRepository>().unwrap();
    assert_eq!(notes.count().await.unwrap(), 2);
    assert_eq!(
        notes.last_title().await.unwrap().as_deref(),
        Some("after 1 (injected)")
    );

    application.shutdown().await;
}

#[tokio::test]
async fn test_annotated_migrations_can_be_rolled_back() {
    init_test_logger();
    let mut settings = settings();
    settings.app.run_seeders = false;
    let application = ObsidianBootstrapper::new()
        .with_settings(settings)
        .bootstrap()
        .await
        .unwrap();

    let manager = application.migration_manager().unwrap();
    assert_eq!(manager.migration_ids(), vec!["2024_03_01_000001_create_notes"]);

    let report = manager.rollback().await.unwrap();
    assert_eq!(report.reverted, vec!["2024_03_01_000001_create_notes".to_string()]);

    let statuses = manager.status().await.unwrap();
    assert_eq!(statuses[0].state, MigrationState::Pending);

    application.shutdown().await;
}
