use agrinews_db::DbError;
use agrinews_scraper::ScraperError;
use agrinews_summarizer::SummarizerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("store unreachable: {0}")]
    StoreUnavailable(#[source] DbError),

    #[error("unknown source '{0}'")]
    UnknownSource(String),

    #[error("source '{0}' is disabled")]
    SourceDisabled(String),

    #[error("GOOGLE_API_KEY is not set; generation is unavailable")]
    MissingApiKey,

    #[error("nothing to aggregate: {0}")]
    NoInput(&'static str),

    #[error("demand forecast is not valid JSON: {0}")]
    MalformedForecast(String),

    #[error(transparent)]
    Summarizer(#[from] SummarizerError),

    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("failed to encode job input: {0}")]
    Encode(#[from] serde_json::Error),
}
