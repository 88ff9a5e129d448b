use crate::app_config::AppConfig;
use crate::ConfigError;

/// Browser identity sent with every source request. Several ministry sites
/// reject non-browser user agents outright.
pub const DEFAULT_SCRAPER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro-preview-05-06";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Upper bound on care logs fed into one weekly suggestion prompt.
pub const MAX_WEEKLY_LOG_LIMIT: usize = 10;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be exercised with a plain
/// `HashMap` lookup.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;

    let bind_addr = parse_addr("AGRINEWS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("AGRINEWS_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "AGRINEWS_SOURCES_PATH",
        "./config/sources.yaml",
    ));

    let db_max_connections = parse_u32("AGRINEWS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AGRINEWS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AGRINEWS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let db_statement_timeout_secs = parse_u64("AGRINEWS_DB_STATEMENT_TIMEOUT_SECS", "30")?;
    if db_statement_timeout_secs == 0 {
        return Err(invalid(
            "AGRINEWS_DB_STATEMENT_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }

    let scraper_request_timeout_secs = parse_u64("AGRINEWS_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("AGRINEWS_SCRAPER_USER_AGENT", DEFAULT_SCRAPER_USER_AGENT);
    let max_concurrent_sources = parse_usize("AGRINEWS_MAX_CONCURRENT_SOURCES", "4")?;
    if max_concurrent_sources == 0 {
        return Err(invalid(
            "AGRINEWS_MAX_CONCURRENT_SOURCES",
            "must be at least 1".to_string(),
        ));
    }
    let source_timeout_secs = parse_u64("AGRINEWS_SOURCE_TIMEOUT_SECS", "120")?;

    let gemini_api_key = lookup("GOOGLE_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let gemini_model = or_default("AGRINEWS_GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
    let gemini_base_url = or_default("AGRINEWS_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL)
        .trim_end_matches('/')
        .to_string();
    let generation_timeout_secs = parse_u64("AGRINEWS_GENERATION_TIMEOUT_SECS", "90")?;

    let weekly_log_limit = parse_usize("AGRINEWS_WEEKLY_LOG_LIMIT", "10")?;
    if weekly_log_limit == 0 || weekly_log_limit > MAX_WEEKLY_LOG_LIMIT {
        return Err(invalid(
            "AGRINEWS_WEEKLY_LOG_LIMIT",
            format!("must be between 1 and {MAX_WEEKLY_LOG_LIMIT}"),
        ));
    }
    let demand_article_limit = parse_usize("AGRINEWS_DEMAND_ARTICLE_LIMIT", "20")?;
    let demand_cache_ttl_secs = parse_u64("AGRINEWS_DEMAND_CACHE_TTL_SECS", "3600")?;
    let demand_cache_capacity = parse_usize("AGRINEWS_DEMAND_CACHE_CAPACITY", "16")?;

    // 22:00 UTC is 06:00 Asia/Manila.
    let ingest_cron = or_default("AGRINEWS_INGEST_CRON", "0 0 22 * * *");
    let weekly_cron = or_default("AGRINEWS_WEEKLY_CRON", "0 0 23 * * SUN");

    Ok(AppConfig {
        database_url,
        bind_addr,
        log_level,
        sources_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        db_statement_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        max_concurrent_sources,
        source_timeout_secs,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        generation_timeout_secs,
        weekly_log_limit,
        demand_article_limit,
        demand_cache_ttl_secs,
        demand_cache_capacity,
        ingest_cron,
        weekly_cron,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
