use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sources_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Server-side `statement_timeout` applied to every pooled connection.
    pub db_statement_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub max_concurrent_sources: usize,
    pub source_timeout_secs: u64,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub generation_timeout_secs: u64,
    pub weekly_log_limit: usize,
    pub demand_article_limit: usize,
    pub demand_cache_ttl_secs: u64,
    pub demand_cache_capacity: usize,
    pub ingest_cron: String,
    pub weekly_cron: String,
}

impl AppConfig {
    /// Whether the demand forecast job should memoize generator output.
    #[must_use]
    pub fn demand_cache_enabled(&self) -> bool {
        self.demand_cache_ttl_secs > 0 && self.demand_cache_capacity > 0
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "db_statement_timeout_secs",
                &self.db_statement_timeout_secs,
            )
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("max_concurrent_sources", &self.max_concurrent_sources)
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .field("weekly_log_limit", &self.weekly_log_limit)
            .field("demand_article_limit", &self.demand_article_limit)
            .field("demand_cache_ttl_secs", &self.demand_cache_ttl_secs)
            .field("demand_cache_capacity", &self.demand_cache_capacity)
            .field("ingest_cron", &self.ingest_cron)
            .field("weekly_cron", &self.weekly_cron)
            .finish()
    }
}
