//! Insight Summarizer Gateway.
//!
//! Wraps one call to a text-generation capability ([`TextGenerator`]) that
//! turns raw text into a short insight. [`GeminiClient`] is the production
//! implementation; [`CachedGenerator`] is an opt-in bounded memo in front
//! of any generator.

pub mod cache;
pub mod error;
pub mod fence;
pub mod gateway;
pub mod gemini;
pub mod generator;
pub mod prompts;

pub use cache::CachedGenerator;
pub use error::SummarizerError;
pub use fence::strip_code_fence;
pub use gateway::{summarize, Insight};
pub use gemini::GeminiClient;
pub use generator::{Generation, TextGenerator};
