//! Gemini `generateContent` client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SummarizerError;
use crate::generator::{Generation, TextGenerator};

/// Longest provider error body echoed back in [`SummarizerError::Provider`].
const MAX_ERROR_BODY_CHARS: usize = 300;

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Creates a client for `model` served under `base_url`.
    ///
    /// `timeout_secs` bounds the whole request, including reading the body.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, SummarizerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{model}:generateContent",
                base_url.trim_end_matches('/')
            ),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Generation, SummarizerError> {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(SummarizerError::Provider(format!(
                "Gemini returned status {status}: {snippet}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::Provider(format!("Gemini response parse error: {e}")))?;

        Ok(interpret(parsed))
    }
}

fn interpret(response: GenerateResponse) -> Generation {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Generation::Blocked { reason };
    }

    let Some(first) = response.candidates.into_iter().next() else {
        return Generation::Text(String::new());
    };

    if first.finish_reason.as_deref() == Some("SAFETY") {
        return Generation::Blocked {
            reason: "SAFETY".to_string(),
        };
    }

    let text = first
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();
    Generation::Text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Generation {
        interpret(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn concatenates_text_parts_of_first_candidate() {
        let generation = parse(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"Rice "},{"text":"prices rose."}]},"finishReason":"STOP"},
                {"content":{"parts":[{"text":"ignored"}]}}
            ]}"#,
        );
        assert_eq!(generation, Generation::Text("Rice prices rose.".to_string()));
    }

    #[test]
    fn prompt_block_reason_is_blocked() {
        let generation = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert_eq!(
            generation,
            Generation::Blocked {
                reason: "SAFETY".to_string()
            }
        );
    }

    #[test]
    fn other_block_reasons_are_passed_through() {
        let generation = parse(r#"{"candidates":[],"promptFeedback":{"blockReason":"OTHER"}}"#);
        assert!(matches!(generation, Generation::Blocked { ref reason } if reason == "OTHER"));
    }

    #[test]
    fn safety_finish_reason_is_blocked() {
        let generation = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(generation, Generation::Blocked { .. }));
    }

    #[test]
    fn no_candidates_is_empty_text() {
        assert_eq!(parse("{}"), Generation::Text(String::new()));
    }

    #[test]
    fn endpoint_includes_model_and_trims_base() {
        let client = GeminiClient::new("http://localhost:9/", "gemini-test", "k", 5).unwrap();
        assert_eq!(
            client.endpoint,
            "http://localhost:9/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = GeminiClient::new("http://localhost:9", "m", "super-secret", 5).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
