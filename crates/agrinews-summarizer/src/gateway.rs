use serde::Serialize;

use crate::error::SummarizerError;
use crate::fence::strip_code_fence;
use crate::generator::{Generation, TextGenerator};
use crate::prompts::compose;

/// Generated text, fence-stripped and trimmed. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub text: String,
}

/// Runs `raw_text` through `generator` once, prefixed by `template`.
///
/// # Errors
///
/// - [`SummarizerError::EmptyInput`] if `raw_text` is blank; no call is made.
/// - [`SummarizerError::SafetyBlocked`] if the provider refused to answer.
/// - [`SummarizerError::EmptyResponse`] if nothing is left after stripping.
/// - Any transport or provider error from the generator.
pub async fn summarize<G>(
    generator: &G,
    raw_text: &str,
    template: &str,
) -> Result<Insight, SummarizerError>
where
    G: TextGenerator + ?Sized,
{
    if raw_text.trim().is_empty() {
        return Err(SummarizerError::EmptyInput);
    }

    match generator.generate(&compose(template, raw_text)).await? {
        Generation::Blocked { reason } => Err(SummarizerError::SafetyBlocked { reason }),
        Generation::Text(raw) => {
            let text = strip_code_fence(&raw);
            if text.is_empty() {
                Err(SummarizerError::EmptyResponse)
            } else {
                Ok(Insight { text })
            }
        }
    }
}
