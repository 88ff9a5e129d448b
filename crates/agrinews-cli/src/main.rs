mod ingest;
mod insights;
mod logs;
mod news;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::ingest::IngestCommands;
use crate::insights::InsightsCommands;
use crate::logs::{LogsCommands, PlantCommands};
use crate::news::NewsCommands;

#[derive(Debug, Parser)]
#[command(name = "agrinews-cli")]
#[command(about = "Agricultural news ingestion and insight reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run or inspect news ingestion
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
    /// Generate or show derived reports
    Insights {
        #[command(subcommand)]
        command: InsightsCommands,
    },
    /// Record or list plant care logs and registered plants
    Logs {
        #[command(subcommand)]
        command: LogsCommands,
    },
    /// List stored news articles
    News {
        #[command(subcommand)]
        command: NewsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = agrinews_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("agrinews-cli: no command given; see --help");
        return Ok(());
    };

    let pool_config = agrinews_db::PoolConfig::from_app_config(&config);
    let pool = agrinews_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                agrinews_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = agrinews_db::run_migrations(&pool).await?;
                println!("applied {applied} migrations");
            }
        },
        Commands::Ingest { command } => match command {
            IngestCommands::Run { source, dry_run } => {
                ingest::run_ingest(&pool, &config, source.as_deref(), dry_run).await?;
            }
            IngestCommands::Status { limit } => {
                ingest::run_ingest_status(&pool, i64::from(limit)).await?;
            }
        },
        Commands::Insights { command } => match command {
            InsightsCommands::Weekly => insights::run_weekly(&pool, &config).await?,
            InsightsCommands::Demand => insights::run_demand(&pool, &config).await?,
            InsightsCommands::Latest => insights::run_latest(&pool).await?,
        },
        Commands::Logs { command } => match command {
            LogsCommands::Add(args) => logs::run_logs_add(&pool, args).await?,
            LogsCommands::List { limit } => {
                logs::run_logs_list(&pool, i64::from(limit)).await?;
            }
            LogsCommands::Plant { command } => match command {
                PlantCommands::Add { name } => logs::run_plant_add(&pool, &name).await?,
                PlantCommands::List => logs::run_plant_list(&pool).await?,
            },
        },
        Commands::News { command } => match command {
            NewsCommands::List { limit } => news::run_news_list(&pool, i64::from(limit)).await?,
        },
    }

    Ok(())
}

/// Format a timestamp for table output.
fn fmt_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Shorten `text` to `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
