//! # 示例应用程序
//!
//! 演示 Obsidian 的数据库迁移、数据填充和依赖注入启动流程

mod blog;

use anyhow::Context;
use blog::PostService;
use clap::{Parser, Subcommand};
use data_abstractions::Database;
use data_migrations::{MigrationManager, MigrationReport, MigrationStatus, SeederRunner};
use data_sqlx::SqlxDatabase;
use di_impl::Container;
use infrastructure_composition::{
    LoggingConfig, ManifestComponentScanner, ObsidianBootstrapper, ObsidianSettings,
    SettingsLoader,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Obsidian 示例应用")]
struct Args {
    /// 配置文件路径, 未指定时读取可选的 obsidian.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// 执行所有待执行的迁移
    Migrate,
    /// 撤销所有已执行的迁移
    Rollback,
    /// 撤销最近执行的一个迁移
    RollbackLast,
    /// 撤销全部迁移后重新执行
    Fresh,
    /// 显示迁移状态
    Status {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 执行数据填充器
    Seed,
    /// 完整启动应用并列出已加载的组件
    Boot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    LoggingConfig::default()
        .with_level(args.log_level.clone())
        .init()?;

    let loader = match &args.config {
        Some(path) => SettingsLoader::new().with_file(path),
        None => SettingsLoader::new(),
    };

    match args.command {
        Command::Boot => boot(loader).await,
        Command::Seed => seed(&loader.load()?).await,
        command => run_migrations(&loader.load()?, command).await,
    }
}

/// 连接数据库
async fn connect(settings: &ObsidianSettings) -> anyhow::Result<Arc<dyn Database>> {
    let database = SqlxDatabase::connect(&settings.database)
        .await
        .with_context(|| format!("无法连接 {} 数据库", settings.database.db_type))?;
    Ok(Arc::new(database))
}

/// 迁移相关命令
async fn run_migrations(settings: &ObsidianSettings, command: Command) -> anyhow::Result<()> {
    let database = connect(settings).await?;
    let mut manager = MigrationManager::new(Arc::clone(&database));
    manager.discover(&settings.app.base_namespace)?;
    info!("已发现 {} 个迁移", manager.len());

    let outcome = execute_migration_command(&manager, command).await;
    database.close().await;
    outcome
}

async fn execute_migration_command(
    manager: &MigrationManager,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Migrate => print_report(&manager.migrate().await?),
        Command::Rollback => print_report(&manager.rollback().await?),
        Command::RollbackLast => print_report(&manager.rollback_last().await?),
        Command::Fresh => print_report(&manager.fresh().await?),
        Command::Status { json } => {
            let statuses = manager.status().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print!("{}", render_status(&statuses));
            }
        }
        Command::Seed | Command::Boot => anyhow::bail!("不是迁移命令: {:?}", command),
    }
    Ok(())
}

/// 执行数据填充器
async fn seed(settings: &ObsidianSettings) -> anyhow::Result<()> {
    let database = connect(settings).await?;
    let namespace = settings.app.base_namespace.as_str();

    let container = Arc::new(Container::new());
    container.register_instance::<dyn Database>(Arc::clone(&database));
    ManifestComponentScanner::new().register_namespace(&container, namespace);

    let outcome = SeederRunner::new(container, Arc::clone(&database))
        .run(namespace)
        .await;
    database.close().await;

    println!("已执行 {} 个数据填充器", outcome?);
    Ok(())
}

/// 完整启动并列出已加载的组件
async fn boot(loader: SettingsLoader) -> anyhow::Result<()> {
    let application = ObsidianBootstrapper::new()
        .with_loader(loader)
        .bootstrap()
        .await?;

    for type_info in application.container().singleton_types() {
        info!("已加载组件: {}", type_info.name);
    }

    let posts = application.container().resolve::<PostService>()?;
    info!("文章数量: {}", posts.count().await?);

    application.shutdown().await;
    Ok(())
}

fn print_report(report: &MigrationReport) {
    if report.is_empty() {
        println!("没有需要执行的迁移");
        return;
    }
    for id in &report.reverted {
        println!("已撤销: {}", id);
    }
    for id in &report.applied {
        println!("已执行: {}", id);
    }
}

/// 渲染迁移状态表格
fn render_status(statuses: &[MigrationStatus]) -> String {
    const HEADER: &str = "Migration";

    let width = statuses
        .iter()
        .map(|status| status.id.len())
        .max()
        .unwrap_or(0)
        .max(HEADER.len());

    let mut table = format!("{:<width$}  Status\n", HEADER);
    table.push_str(&format!("{}\n", "-".repeat(width + 8)));
    for status in statuses {
        table.push_str(&format!("{:<width$}  {}\n", status.id, status.state));
    }
    table
}
