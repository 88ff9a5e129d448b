//! Database operations for the `news` table.

use agrinews_core::{normalize_title, ArticleRecord};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `news` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NewsRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a conditional article insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// A record with the same trimmed title already exists; nothing was written.
    SkippedDuplicate,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts an article unless one with the same trimmed title already exists.
///
/// Uniqueness is enforced by the `news_title_key` constraint in the same
/// statement, so concurrent writers racing on one title yield exactly one row
/// and every other caller sees [`InsertOutcome::SkippedDuplicate`]. Existing
/// rows are never updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn insert_news_if_absent(
    pool: &PgPool,
    record: &ArticleRecord,
) -> Result<InsertOutcome, DbError> {
    let title = normalize_title(&record.title);

    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO news (title, description, url, image_url) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (title) DO NOTHING \
         RETURNING id",
    )
    .bind(&title)
    .bind(&record.description)
    .bind(&record.url)
    .bind(record.image_url.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(id.map_or(InsertOutcome::SkippedDuplicate, InsertOutcome::Inserted))
}

/// Returns the most recent `limit` articles, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_news(pool: &PgPool, limit: i64) -> Result<Vec<NewsRow>, DbError> {
    let rows = sqlx::query_as::<_, NewsRow>(
        "SELECT id, title, description, url, image_url, created_at \
         FROM news \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
