//! Derived report command handlers for the CLI.

use agrinews_core::{CropTrend, DemandForecast};
use agrinews_ingest::{Pipeline, Trigger};
use clap::Subcommand;

use crate::fmt_time;

/// Sub-commands available under `insights`.
#[derive(Debug, Subcommand)]
pub enum InsightsCommands {
    /// Generate a weekly growth suggestion from the newest care logs
    Weekly,
    /// Generate a crop price outlook from the newest articles
    Demand,
    /// Show the most recently stored suggestion and forecast
    Latest,
}

/// # Errors
///
/// Returns an error if `GOOGLE_API_KEY` is unset, there are no care logs,
/// or generation or storage fails. The run is recorded as failed first.
pub(crate) async fn run_weekly(
    pool: &sqlx::PgPool,
    config: &agrinews_core::AppConfig,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let row = pipeline.weekly_suggestion(pool, Trigger::Cli).await?;
    println!("weekly suggestion #{} ({})", row.id, fmt_time(row.created_at));
    println!("{}", row.suggestion);
    Ok(())
}

/// # Errors
///
/// Returns an error if `GOOGLE_API_KEY` is unset, there are no articles, or
/// the generated forecast is malformed or cannot be stored.
pub(crate) async fn run_demand(
    pool: &sqlx::PgPool,
    config: &agrinews_core::AppConfig,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let (row, forecast) = pipeline.demand_forecast(pool, Trigger::Cli).await?;
    println!("demand forecast #{} ({})", row.id, fmt_time(row.created_at));
    print_forecast(&forecast);
    Ok(())
}

/// # Errors
///
/// Returns an error if the database query fails or a stored forecast is no
/// longer valid JSON.
pub(crate) async fn run_latest(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    match agrinews_db::latest_weekly_suggestion(pool).await? {
        Some(row) => {
            println!("weekly suggestion #{} ({})", row.id, fmt_time(row.created_at));
            println!("{}", row.suggestion);
        }
        None => println!("no weekly suggestion yet; run `insights weekly` first"),
    }
    println!();

    match agrinews_db::latest_demand_forecast(pool).await? {
        Some(row) => {
            let forecast: DemandForecast = serde_json::from_str(&row.json)?;
            println!("demand forecast #{} ({})", row.id, fmt_time(row.created_at));
            print_forecast(&forecast);
        }
        None => println!("no demand forecast yet; run `insights demand` first"),
    }
    Ok(())
}

fn print_forecast(forecast: &DemandForecast) {
    print_trends("INCREASING", &forecast.increasing);
    print_trends("DECREASING", &forecast.decreasing);
}

fn print_trends(label: &str, trends: &[CropTrend]) {
    println!("{label}");
    if trends.is_empty() {
        println!("  (none)");
    }
    for trend in trends {
        println!(
            "  {:<20}PHP {:>9.2}  {}",
            trend.crop, trend.price, trend.analysis
        );
    }
}
