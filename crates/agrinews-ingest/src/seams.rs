//! Capability seams between the orchestrator and the outside world.
//!
//! Production code plugs in [`NewsClient`] and [`PgPool`]; tests plug in
//! in-memory fakes.

use agrinews_core::{ArticleDraft, ArticleRecord, SourceConfig};
use agrinews_db::{DbError, DemandRow, InsertOutcome, WeeklySuggestionRow};
use agrinews_scraper::{NewsClient, ScraperError};
use async_trait::async_trait;
use sqlx::PgPool;

/// Produces the newest article draft for a configured source.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// # Errors
    ///
    /// Any retrieval or extraction failure for this source.
    async fn next_article(&self, source: &SourceConfig) -> Result<ArticleDraft, ScraperError>;
}

/// Persists article records with insert-if-absent semantics keyed on the
/// trimmed title.
#[async_trait]
pub trait ArticleWriter: Send + Sync {
    /// # Errors
    ///
    /// Store failures. A duplicate title is not an error.
    async fn insert_if_absent(&self, record: &ArticleRecord) -> Result<InsertOutcome, DbError>;
}

/// Append-only storage for derived insight artifacts.
#[async_trait]
pub trait InsightStore: Send + Sync {
    /// # Errors
    ///
    /// Store failures.
    async fn save_weekly_suggestion(&self, text: &str) -> Result<WeeklySuggestionRow, DbError>;

    /// # Errors
    ///
    /// Store failures.
    async fn save_demand_forecast(&self, json: &str) -> Result<DemandRow, DbError>;
}

#[async_trait]
impl ArticleSource for NewsClient {
    async fn next_article(&self, source: &SourceConfig) -> Result<ArticleDraft, ScraperError> {
        self.fetch_next_article(source).await
    }
}

#[async_trait]
impl ArticleWriter for PgPool {
    async fn insert_if_absent(&self, record: &ArticleRecord) -> Result<InsertOutcome, DbError> {
        agrinews_db::insert_news_if_absent(self, record).await
    }
}

#[async_trait]
impl InsightStore for PgPool {
    async fn save_weekly_suggestion(&self, text: &str) -> Result<WeeklySuggestionRow, DbError> {
        agrinews_db::insert_weekly_suggestion(self, text).await
    }

    async fn save_demand_forecast(&self, json: &str) -> Result<DemandRow, DbError> {
        agrinews_db::insert_demand_forecast(self, json).await
    }
}
