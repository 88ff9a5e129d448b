//! Plant care log command handlers for the CLI.

use agrinews_db::{NewPlantLog, PlantRegistration};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use crate::{fmt_time, truncate};

/// Sub-commands available under `logs`.
#[derive(Debug, Subcommand)]
pub enum LogsCommands {
    /// Record one care observation
    Add(AddLogArgs),
    /// Show the newest care logs
    List {
        /// Maximum number of logs to show
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Manage the plant registry
    Plant {
        #[command(subcommand)]
        command: PlantCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum PlantCommands {
    /// Register a plant name
    Add {
        /// Plant name or bed label
        name: String,
    },
    /// List registered plants
    List,
}

#[derive(Debug, Args)]
pub struct AddLogArgs {
    /// Plant name or bed label
    #[arg(long)]
    pub plant: String,
    /// Observation time as RFC 3339 (defaults to now)
    #[arg(long)]
    pub date: Option<DateTime<Utc>>,
    /// The plant was watered
    #[arg(long)]
    pub watered: bool,
    /// Fertilizer applied, if any
    #[arg(long)]
    pub fertilizer: Option<String>,
    /// Disease observed, if any
    #[arg(long)]
    pub disease: Option<String>,
    /// Plant height in centimetres
    #[arg(long)]
    pub height_cm: Option<Decimal>,
    /// Growth stage, e.g. seedling or flowering
    #[arg(long)]
    pub stage: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
}

impl From<AddLogArgs> for NewPlantLog {
    fn from(args: AddLogArgs) -> Self {
        Self {
            plant: args.plant,
            log_date: args.date,
            watered: args.watered,
            fertilizer_applied: args.fertilizer,
            disease: args.disease,
            height_cm: args.height_cm,
            growth_stage: args.stage,
            note: args.note,
        }
    }
}

/// # Errors
///
/// Returns an error if the plant name is blank or the insert fails.
pub(crate) async fn run_logs_add(pool: &sqlx::PgPool, args: AddLogArgs) -> anyhow::Result<()> {
    if args.plant.trim().is_empty() {
        anyhow::bail!("--plant must not be blank");
    }
    let row = agrinews_db::insert_plant_log(pool, &args.into()).await?;
    println!(
        "logged #{} for {} at {}",
        row.id,
        row.plant,
        fmt_time(row.log_date)
    );
    Ok(())
}

/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_logs_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let logs = agrinews_db::list_recent_plant_logs(pool, limit).await?;
    if logs.is_empty() {
        println!("no care logs yet; add one with `logs add --plant <name>`");
        return Ok(());
    }

    println!(
        "{:<18}{:<20}{:<9}{:<11}{:<14}DISEASE",
        "DATE", "PLANT", "WATERED", "HEIGHT", "STAGE"
    );
    for log in &logs {
        println!(
            "{:<18}{:<20}{:<9}{:<11}{:<14}{}",
            fmt_time(log.log_date),
            truncate(&log.plant, 18),
            if log.watered { "yes" } else { "no" },
            log.height_cm.map(|h| format!("{h} cm")).unwrap_or_default(),
            log.growth_stage.as_deref().unwrap_or(""),
            log.disease.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the name is blank or the insert fails.
pub(crate) async fn run_plant_add(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("plant name must not be blank");
    }
    match agrinews_db::register_plant(pool, name).await? {
        PlantRegistration::Created(row) => println!("registered plant #{} {}", row.id, row.name),
        PlantRegistration::AlreadyRegistered(row) => {
            println!("plant {} is already registered as #{}", row.name, row.id);
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_plant_list(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let plants = agrinews_db::list_plants(pool).await?;
    if plants.is_empty() {
        println!("no plants registered; add one with `logs plant add <name>`");
        return Ok(());
    }

    println!("{:<8}{:<32}REGISTERED", "ID", "NAME");
    for plant in &plants {
        println!(
            "{:<8}{:<32}{}",
            plant.id,
            truncate(&plant.name, 30),
            fmt_time(plant.created_at)
        );
    }
    Ok(())
}
