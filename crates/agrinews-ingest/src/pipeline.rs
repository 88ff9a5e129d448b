use std::sync::Arc;
use std::time::Duration;

use agrinews_core::{AppConfig, DemandForecast, SourceConfig};
use agrinews_db::{DemandRow, WeeklySuggestionRow};
use agrinews_scraper::NewsClient;
use agrinews_summarizer::{CachedGenerator, GeminiClient, TextGenerator};
use sqlx::PgPool;

use crate::cycle::CycleOptions;
use crate::error::IngestError;
use crate::runs::{self, IngestRun, Trigger};

/// Production clients wired from an [`AppConfig`].
///
/// Built once per process. The demand generator may carry a cache; keeping
/// one `Pipeline` alive is what lets that cache outlive a single request.
pub struct Pipeline {
    scraper: NewsClient,
    generator: Arc<dyn TextGenerator>,
    demand_generator: Arc<dyn TextGenerator>,
    options: CycleOptions,
    weekly_log_limit: usize,
    demand_article_limit: usize,
}

impl Pipeline {
    /// # Errors
    ///
    /// - [`IngestError::MissingApiKey`] if `GOOGLE_API_KEY` is unset.
    /// - [`IngestError::Scraper`] / [`IngestError::Summarizer`] if an HTTP
    ///   client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, IngestError> {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .ok_or(IngestError::MissingApiKey)?;

        let scraper = NewsClient::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
        )?;
        let gemini = Arc::new(GeminiClient::new(
            &config.gemini_base_url,
            &config.gemini_model,
            api_key,
            config.generation_timeout_secs,
        )?);

        let demand_generator: Arc<dyn TextGenerator> = if config.demand_cache_enabled() {
            Arc::new(CachedGenerator::new(
                Arc::clone(&gemini),
                Duration::from_secs(config.demand_cache_ttl_secs),
                config.demand_cache_capacity,
            ))
        } else {
            gemini.clone()
        };

        Ok(Self {
            scraper,
            generator: gemini,
            demand_generator,
            options: CycleOptions::from_app_config(config),
            weekly_log_limit: config.weekly_log_limit,
            demand_article_limit: config.demand_article_limit,
        })
    }

    /// Runs one ingestion cycle over `sources`.
    ///
    /// # Errors
    ///
    /// See [`runs::run_ingest`].
    pub async fn ingest(
        &self,
        pool: &PgPool,
        sources: &[SourceConfig],
        dry_run: bool,
        trigger: Trigger,
    ) -> Result<IngestRun, IngestError> {
        let options = CycleOptions {
            dry_run,
            ..self.options.clone()
        };
        runs::run_ingest(
            pool,
            sources,
            &self.scraper,
            self.generator.as_ref(),
            &options,
            trigger,
        )
        .await
    }

    /// # Errors
    ///
    /// See [`runs::run_weekly_suggestion`].
    pub async fn weekly_suggestion(
        &self,
        pool: &PgPool,
        trigger: Trigger,
    ) -> Result<WeeklySuggestionRow, IngestError> {
        runs::run_weekly_suggestion(
            pool,
            self.generator.as_ref(),
            self.weekly_log_limit,
            trigger,
        )
        .await
    }

    /// # Errors
    ///
    /// See [`runs::run_demand_forecast`].
    pub async fn demand_forecast(
        &self,
        pool: &PgPool,
        trigger: Trigger,
    ) -> Result<(DemandRow, DemandForecast), IngestError> {
        runs::run_demand_forecast(
            pool,
            self.demand_generator.as_ref(),
            self.demand_article_limit,
            trigger,
        )
        .await
    }
}
