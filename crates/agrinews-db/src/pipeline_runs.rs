//! Finished-run records.
//!
//! A trigger writes its run once, after the work is done: one `pipeline_runs`
//! row with the counters, plus one `pipeline_run_sources` row per source for
//! ingestion. There is no in-progress state to reconcile.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunRow {
    pub id: i64,
    /// `ingest`, `weekly_suggestion` or `demand_forecast`.
    pub kind: String,
    /// `cli`, `api` or `scheduler`.
    pub triggered_by: String,
    pub succeeded: bool,
    pub inserted: i32,
    pub skipped_duplicate: i32,
    pub failed: i32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunSourceRow {
    pub source_slug: String,
    pub outcome: String,
    pub title: Option<String>,
    pub failure_stage: Option<String>,
    pub failure_kind: Option<String>,
    pub message: Option<String>,
}

/// Input for [`record_run`].
#[derive(Debug, Clone)]
pub struct NewRun<'a> {
    pub kind: &'a str,
    pub triggered_by: &'a str,
    pub started_at: DateTime<Utc>,
    pub succeeded: bool,
    pub inserted: i32,
    pub skipped_duplicate: i32,
    pub failed: i32,
    pub error_message: Option<&'a str>,
    pub sources: Vec<NewRunSource<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewRunSource<'a> {
    pub source_slug: &'a str,
    /// `inserted`, `skipped_duplicate` or `failed`.
    pub outcome: &'a str,
    pub title: Option<&'a str>,
    pub failure_stage: Option<&'a str>,
    pub failure_kind: Option<&'a str>,
    pub message: Option<&'a str>,
}

const RUN_SELECT: &str = "SELECT id, kind, triggered_by, succeeded, inserted, \
     skipped_duplicate, failed, error_message, started_at, finished_at \
     FROM pipeline_runs";

/// Writes a finished run and its source rows in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is kept in that
/// case.
pub async fn record_run(pool: &PgPool, run: &NewRun<'_>) -> Result<RunRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, RunRow>(
        "INSERT INTO pipeline_runs \
             (kind, triggered_by, succeeded, inserted, skipped_duplicate, failed, \
              error_message, started_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id, kind, triggered_by, succeeded, inserted, skipped_duplicate, \
                   failed, error_message, started_at, finished_at",
    )
    .bind(run.kind)
    .bind(run.triggered_by)
    .bind(run.succeeded)
    .bind(run.inserted)
    .bind(run.skipped_duplicate)
    .bind(run.failed)
    .bind(run.error_message)
    .bind(run.started_at)
    .fetch_one(&mut *tx)
    .await?;

    for source in &run.sources {
        sqlx::query(
            "INSERT INTO pipeline_run_sources \
                 (run_id, source_slug, outcome, title, failure_stage, failure_kind, message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(row.id)
        .bind(source.source_slug)
        .bind(source.outcome)
        .bind(source.title)
        .bind(source.failure_stage)
        .bind(source.failure_kind)
        .bind(source.message)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(row)
}

/// Newest runs first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_runs(pool: &PgPool, limit: i64) -> Result<Vec<RunRow>, DbError> {
    let rows = sqlx::query_as::<_, RunRow>(&format!(
        "{RUN_SELECT} ORDER BY finished_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has this id, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_run(pool: &PgPool, id: i64) -> Result<RunRow, DbError> {
    sqlx::query_as::<_, RunRow>(&format!("{RUN_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Per-source rows of one ingestion run, ordered by slug.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_run_sources(pool: &PgPool, run_id: i64) -> Result<Vec<RunSourceRow>, DbError> {
    let rows = sqlx::query_as::<_, RunSourceRow>(
        "SELECT source_slug, outcome, title, failure_stage, failure_kind, message \
         FROM pipeline_run_sources \
         WHERE run_id = $1 \
         ORDER BY source_slug",
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
