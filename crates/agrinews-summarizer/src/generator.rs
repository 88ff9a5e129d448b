use async_trait::async_trait;

use crate::error::SummarizerError;

/// Outcome of one generation call that reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    /// The provider refused to answer; `reason` is its block reason verbatim.
    Blocked { reason: String },
}

/// A text-generation capability: one prompt in, one completion out.
///
/// Implementations make exactly one provider call per invocation and never
/// retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// # Errors
    ///
    /// Transport failures and provider responses that cannot be interpreted.
    /// A safety refusal is not an error; it is [`Generation::Blocked`].
    async fn generate(&self, prompt: &str) -> Result<Generation, SummarizerError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<Generation, SummarizerError> {
        (**self).generate(prompt).await
    }
}
