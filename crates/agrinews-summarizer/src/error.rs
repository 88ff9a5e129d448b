use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation provider error: {0}")]
    Provider(String),

    #[error("generation blocked by safety filter: {reason}")]
    SafetyBlocked { reason: String },

    #[error("input text is empty")]
    EmptyInput,

    #[error("generation returned no text")]
    EmptyResponse,
}

impl SummarizerError {
    /// `true` when the underlying request hit the client timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, SummarizerError::Http(e) if e.is_timeout())
    }
}
