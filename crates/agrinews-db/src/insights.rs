//! Database operations for derived insight artifacts: `weekly_suggestions`
//! and `demand`. Both tables are append-only; readers take the newest row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `weekly_suggestions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeeklySuggestionRow {
    pub id: i64,
    pub suggestion: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `demand` table. `json` holds the serialized forecast.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DemandRow {
    pub id: i64,
    pub json: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// weekly_suggestions
// ---------------------------------------------------------------------------

/// Appends a weekly suggestion.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_weekly_suggestion(
    pool: &PgPool,
    suggestion: &str,
) -> Result<WeeklySuggestionRow, DbError> {
    let row = sqlx::query_as::<_, WeeklySuggestionRow>(
        "INSERT INTO weekly_suggestions (suggestion) \
         VALUES ($1) \
         RETURNING id, suggestion, created_at",
    )
    .bind(suggestion)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the newest weekly suggestion, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_weekly_suggestion(
    pool: &PgPool,
) -> Result<Option<WeeklySuggestionRow>, DbError> {
    let row = sqlx::query_as::<_, WeeklySuggestionRow>(
        "SELECT id, suggestion, created_at \
         FROM weekly_suggestions \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// demand
// ---------------------------------------------------------------------------

/// Appends a demand forecast.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_demand_forecast(pool: &PgPool, json: &str) -> Result<DemandRow, DbError> {
    let row = sqlx::query_as::<_, DemandRow>(
        "INSERT INTO demand (json) \
         VALUES ($1) \
         RETURNING id, json, created_at",
    )
    .bind(json)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the newest demand forecast, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_demand_forecast(pool: &PgPool) -> Result<Option<DemandRow>, DbError> {
    let row = sqlx::query_as::<_, DemandRow>(
        "SELECT id, json, created_at \
         FROM demand \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
