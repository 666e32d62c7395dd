//! 示例博客领域
//!
//! 演示 `#[repository]` / `#[service]` 组件、`#[migration]` 迁移和 `#[seeder]` 数据填充器。

use async_trait::async_trait;
use component_macros::{migration, repository, seeder, service};
use data_abstractions::{Connection, Database, DatabaseResult, Dialect, SqlValue};
use data_migrations::{Migration, MigrationResult, Schema, SeedResult, Seeder};
use di_abstractions::Inject;
use std::sync::Arc;
use tracing::debug;

const ADMIN_EMAIL: &str = "admin@example.com";

/// 文章仓储
#[repository]
pub struct PostRepository {
    database: Arc<dyn Database>,
}

impl PostRepository {
    /// 文章总数
    pub async fn count(&self) -> DatabaseResult<i64> {
        let mut connection = self.database.connection().await?;
        let count = connection
            .query_scalar("SELECT COUNT(*) FROM posts", &[])
            .await?;
        Ok(count.and_then(|value| value.as_i64()).unwrap_or(0))
    }
}

/// 文章服务
#[service]
pub struct PostService {
    posts: Arc<PostRepository>,
}

impl PostService {
    pub async fn count(&self) -> DatabaseResult<i64> {
        self.posts.count().await
    }

    /// 新站点的第一篇文章标题
    pub fn welcome_title(&self) -> &'static str {
        "欢迎使用 Obsidian"
    }
}

#[migration]
pub struct CreateUsersTable;

#[async_trait]
impl Migration for CreateUsersTable {
    fn id(&self) -> &str {
        "2024_01_15_000001_create_users_table"
    }

    async fn up(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema
            .create_table("users", |table| {
                table
                    .id()
                    .string("name")
                    .not_null()
                    .string("email")
                    .not_null()
                    .unique()
                    .boolean("is_admin")
                    .default_value("FALSE")
                    .timestamps();
            })
            .await
    }

    async fn down(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema.drop_table("users").await
    }
}

#[migration]
pub struct CreatePostsTable;

#[async_trait]
impl Migration for CreatePostsTable {
    fn id(&self) -> &str {
        "2024_01_15_000002_create_posts_table"
    }

    async fn up(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema
            .create_table("posts", |table| {
                table
                    .id()
                    .integer("user_id")
                    .not_null()
                    .string("title")
                    .not_null()
                    .text("body")
                    .timestamps();
            })
            .await
    }

    async fn down(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema.drop_table("posts").await
    }
}

#[migration]
pub struct AddSlugToPosts;

#[async_trait]
impl Migration for AddSlugToPosts {
    fn id(&self) -> &str {
        "2024_02_01_000001_add_slug_to_posts"
    }

    async fn up(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        let definition = match schema.dialect() {
            Dialect::Sqlite => "TEXT",
            Dialect::MySql | Dialect::PostgreSql => "VARCHAR(255)",
        };
        schema.add_column("posts", "slug", definition).await
    }

    async fn down(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema.drop_column("posts", "slug").await
    }
}

/// 管理员账号
#[seeder(priority = 10)]
pub struct AdminUserSeeder;

#[async_trait]
impl Seeder for AdminUserSeeder {
    async fn seed(&self, connection: &mut dyn Connection) -> SeedResult<()> {
        let existing = connection
            .query_scalar(
                "SELECT COUNT(*) FROM users WHERE email = ?",
                &[SqlValue::from(ADMIN_EMAIL)],
            )
            .await?
            .and_then(|value| value.as_i64())
            .unwrap_or(0);
        if existing > 0 {
            debug!("管理员账号已存在, 跳过");
            return Ok(());
        }

        connection
            .execute(
                "INSERT INTO users (name, email, is_admin) VALUES (?, ?, ?)",
                &[
                    SqlValue::from("admin"),
                    SqlValue::from(ADMIN_EMAIL),
                    SqlValue::from(true),
                ],
            )
            .await?;
        Ok(())
    }
}

/// 欢迎文章, 依赖管理员账号
#[seeder]
pub struct WelcomePostSeeder {
    posts: Inject<PostService>,
}

#[async_trait]
impl Seeder for WelcomePostSeeder {
    async fn seed(&self, connection: &mut dyn Connection) -> SeedResult<()> {
        let title = self
            .posts
            .get()
            .map_or("Hello", |posts| posts.welcome_title());

        let existing = connection
            .query_scalar(
                "SELECT COUNT(*) FROM posts WHERE title = ?",
                &[SqlValue::from(title)],
            )
            .await?
            .and_then(|value| value.as_i64())
            .unwrap_or(0);
        if existing > 0 {
            debug!("欢迎文章已存在, 跳过");
            return Ok(());
        }

        let author = connection
            .query_scalar(
                "SELECT id FROM users WHERE email = ?",
                &[SqlValue::from(ADMIN_EMAIL)],
            )
            .await?
            .unwrap_or(SqlValue::Null);

        connection
            .execute(
                "INSERT INTO posts (user_id, title, body) VALUES (?, ?, ?)",
                &[
                    author,
                    SqlValue::from(title),
                    SqlValue::from("第一篇文章由数据填充器创建。"),
                ],
            )
            .await?;
        Ok(())
    }
}
