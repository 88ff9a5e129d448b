use serde::{Deserialize, Serialize};

/// Fields extracted from one article page, before summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDraft {
    /// Canonical permalink of the article.
    pub source_url: String,
    /// Raw extracted title; may carry surrounding whitespace.
    pub title: String,
    pub body_text: String,
    pub image_url: Option<String>,
}

/// A summarized article ready to be written to the `news` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Trimmed title; the dedup key.
    pub title: String,
    /// Generated insight text, not the raw body.
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
}

impl ArticleRecord {
    /// Builds a record from a draft and its generated insight.
    #[must_use]
    pub fn from_draft(draft: ArticleDraft, insight: String) -> Self {
        Self {
            title: normalize_title(&draft.title),
            description: insight,
            url: draft.source_url,
            image_url: draft.image_url,
        }
    }
}

/// Normalizes a title into its dedup key form.
///
/// Only surrounding whitespace is removed; inner text is compared verbatim.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title.trim().to_string()
}
