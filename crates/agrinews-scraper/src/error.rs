use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("could not parse {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl ScraperError {
    /// `true` when the page was retrieved but its markup did not yield the
    /// expected fields. Everything else is a retrieval failure.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            ScraperError::Parse { .. } | ScraperError::InvalidSelector { .. }
        )
    }

    /// `true` when the underlying request hit the client timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScraperError::Http(e) if e.is_timeout())
    }

    pub(crate) fn parse(url: &str, reason: impl Into<String>) -> Self {
        ScraperError::Parse {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
