//! Database operations for the `plant_log` table.

use agrinews_core::CareLog;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `plant_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlantLogRow {
    pub id: i64,
    pub plant: String,
    pub log_date: DateTime<Utc>,
    pub watered: bool,
    pub fertilizer_applied: Option<String>,
    pub disease: Option<String>,
    /// `NUMERIC(5,2)` in the schema.
    pub height_cm: Option<Decimal>,
    pub growth_stage: Option<String>,
    pub note: Option<String>,
}

impl From<PlantLogRow> for CareLog {
    fn from(row: PlantLogRow) -> Self {
        Self {
            plant: row.plant,
            log_date: row.log_date,
            watered: row.watered,
            fertilizer_applied: row.fertilizer_applied,
            disease: row.disease,
            height_cm: row.height_cm,
            growth_stage: row.growth_stage,
            note: row.note,
        }
    }
}

/// Input for [`insert_plant_log`]. `log_date` defaults to `NOW()` when `None`.
#[derive(Debug, Clone, Default)]
pub struct NewPlantLog {
    pub plant: String,
    pub log_date: Option<DateTime<Utc>>,
    pub watered: bool,
    pub fertilizer_applied: Option<String>,
    pub disease: Option<String>,
    pub height_cm: Option<Decimal>,
    pub growth_stage: Option<String>,
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts one care log and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including when `height_cm`
/// does not fit `NUMERIC(5,2)`.
pub async fn insert_plant_log(pool: &PgPool, log: &NewPlantLog) -> Result<PlantLogRow, DbError> {
    let row = sqlx::query_as::<_, PlantLogRow>(
        "INSERT INTO plant_log \
             (plant, log_date, watered, fertilizer_applied, disease, height_cm, growth_stage, note) \
         VALUES ($1, COALESCE($2, NOW()), $3, $4, $5, $6, $7, $8) \
         RETURNING id, plant, log_date, watered, fertilizer_applied, disease, \
                   height_cm, growth_stage, note",
    )
    .bind(log.plant.trim())
    .bind(log.log_date)
    .bind(log.watered)
    .bind(log.fertilizer_applied.as_deref())
    .bind(log.disease.as_deref())
    .bind(log.height_cm)
    .bind(log.growth_stage.as_deref())
    .bind(log.note.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the `limit` most recent care logs ordered by `log_date DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_plant_logs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<PlantLogRow>, DbError> {
    let rows = sqlx::query_as::<_, PlantLogRow>(
        "SELECT id, plant, log_date, watered, fertilizer_applied, disease, \
                height_cm, growth_stage, note \
         FROM plant_log \
         ORDER BY log_date DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
