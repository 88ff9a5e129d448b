//! The plant registry: names that care logs are recorded against.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PlantRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Result of [`register_plant`]. Registering a name twice is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantRegistration {
    Created(PlantRow),
    AlreadyRegistered(PlantRow),
}

impl PlantRegistration {
    #[must_use]
    pub fn row(&self) -> &PlantRow {
        match self {
            PlantRegistration::Created(row) | PlantRegistration::AlreadyRegistered(row) => row,
        }
    }

    #[must_use]
    pub fn into_row(self) -> PlantRow {
        match self {
            PlantRegistration::Created(row) | PlantRegistration::AlreadyRegistered(row) => row,
        }
    }
}

/// Registers a plant under its trimmed name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn register_plant(pool: &PgPool, name: &str) -> Result<PlantRegistration, DbError> {
    let name = name.trim();
    let created = sqlx::query_as::<_, PlantRow>(
        "INSERT INTO plants (name) VALUES ($1) \
         ON CONFLICT (name) DO NOTHING \
         RETURNING id, name, created_at",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = created {
        return Ok(PlantRegistration::Created(row));
    }

    let existing =
        sqlx::query_as::<_, PlantRow>("SELECT id, name, created_at FROM plants WHERE name = $1")
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(PlantRegistration::AlreadyRegistered(existing))
}

/// All registered plants, alphabetically.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_plants(pool: &PgPool) -> Result<Vec<PlantRow>, DbError> {
    let rows =
        sqlx::query_as::<_, PlantRow>("SELECT id, name, created_at FROM plants ORDER BY name, id")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}
