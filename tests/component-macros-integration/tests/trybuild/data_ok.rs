use async_trait::async_trait;
use component_macros::{migration, seeder};
use data_abstractions::Connection;
use data_migrations::{
    global_migration_manifest, global_seeder_manifest, Migration, MigrationResult, Schema,
    SeedResult, Seeder,
};
use di_abstractions::Inject;

#[migration]
struct CreateTags {
    table: String,
}

#[async_trait]
impl Migration for CreateTags {
    fn id(&self) -> &str {
        "2024_01_01_000001_create_tags"
    }

    async fn up(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        let table = if self.table.is_empty() { "tags" } else { self.table.as_str() };
        schema
            .create_table(table, |blueprint| {
                blueprint.id().string("label");
            })
            .await
    }

    async fn down(&self, schema: &mut Schema<'_>) -> MigrationResult<()> {
        schema.drop_table("tags").await
    }
}

struct Palette;

#[seeder(priority = -1, name = "tags")]
struct TagSeeder {
    palette: Inject<Palette>,
}

#[async_trait]
impl Seeder for TagSeeder {
    async fn seed(&self, _connection: &mut dyn Connection) -> SeedResult<()> {
        let _ = self.palette.get();
        Ok(())
    }
}

fn main() {
    let migrations = global_migration_manifest().migrations_in("");
    assert_eq!(migrations.len(), 1);
    assert_eq!(migrations[0].instantiate().id(), "2024_01_01_000001_create_tags");

    let seeders = global_seeder_manifest().seeders_in("");
    assert_eq!(seeders.len(), 1);
    assert_eq!(seeders[0].name, "tags");
    assert_eq!(seeders[0].priority, -1);
}
