//! Postgres persistence for agrinews.
//!
//! One module per table group. All functions take a borrowed [`sqlx::PgPool`]
//! and return [`DbError`].

mod error;
pub mod insights;
pub mod news;
pub mod pipeline_runs;
pub mod plant_logs;
pub mod plants;
mod pool;

pub use error::DbError;
pub use insights::{
    insert_demand_forecast, insert_weekly_suggestion, latest_demand_forecast,
    latest_weekly_suggestion, DemandRow, WeeklySuggestionRow,
};
pub use news::{insert_news_if_absent, list_news, InsertOutcome, NewsRow};
pub use pipeline_runs::{
    get_run, list_run_sources, list_runs, record_run, NewRun, NewRunSource, RunRow, RunSourceRow,
};
pub use plant_logs::{insert_plant_log, list_recent_plant_logs, NewPlantLog, PlantLogRow};
pub use plants::{list_plants, register_plant, PlantRegistration, PlantRow};
pub use pool::{
    connect_pool, health_check, run_migrations, with_statement_timeout, PoolConfig,
};
