use std::str::FromStr;
use std::time::Duration;

use agrinews_core::AppConfig;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::DbError;

// Relative to crates/agrinews-db/Cargo.toml.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Pool sizing. Statements borrow a connection from the pool for their own
/// duration only; nothing holds one across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Upper bound on waiting for a free connection.
    pub acquire_timeout_secs: u64,
    /// Upper bound on executing any single statement, enforced by Postgres.
    pub statement_timeout_secs: u64,
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
            statement_timeout_secs: config.db_statement_timeout_secs,
        }
    }
}

/// Sets `statement_timeout` as a startup parameter, so every session opened
/// with these options has its statements cancelled server-side after `secs`.
#[must_use]
pub fn with_statement_timeout(options: PgConnectOptions, secs: u64) -> PgConnectOptions {
    options.options([("statement_timeout", format!("{secs}s"))])
}

/// Opens the process-wide Postgres pool.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the URL does not parse or no connection can
/// be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, DbError> {
    let options = with_statement_timeout(
        PgConnectOptions::from_str(database_url)?,
        config.statement_timeout_secs,
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Applies pending embedded migrations and returns how many ran.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    let before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let after = applied_migrations(pool).await;
    Ok(after.saturating_sub(before))
}

/// Zero on a fresh database, where the bookkeeping table does not exist yet.
async fn applied_migrations(pool: &PgPool) -> usize {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
        .map_or(0, |n| usize::try_from(n).unwrap_or(0))
}

/// Round-trips `SELECT 1` to prove the store answers.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if no connection can be acquired or the query
/// fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}
