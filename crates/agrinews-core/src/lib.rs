//! Shared configuration and domain types for agrinews.

pub mod app_config;
pub mod articles;
pub mod care_logs;
pub mod config;
pub mod forecast;
pub mod sources;

use thiserror::Error;

pub use app_config::AppConfig;
pub use articles::{normalize_title, ArticleDraft, ArticleRecord};
pub use care_logs::CareLog;
pub use config::{load_app_config, load_app_config_from_env};
pub use forecast::{CropTrend, DemandForecast};
pub use sources::{load_sources, parse_sources, LinkPick, SourceConfig, SourcesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
