use std::time::Duration;

use agrinews_core::{ArticleDraft, SourceConfig};
use reqwest::Client;

use crate::error::ScraperError;
use crate::extract::{extract_article, select_article_link};

/// HTTP client for news listing and article pages.
///
/// Each call to [`NewsClient::fetch_next_article`] costs exactly two
/// requests: the listing page, then the article it links to.
pub struct NewsClient {
    client: Client,
}

impl NewsClient {
    /// Creates a `NewsClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx status.
    /// - [`ScraperError::Http`] on network, TLS or timeout failure.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        validate_url(url)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetches the listing page of `source`, follows the configured link
    /// and extracts the article it points to.
    ///
    /// # Errors
    ///
    /// Any retrieval error from [`NewsClient::fetch_html`] for either page,
    /// or an extraction error from [`select_article_link`] /
    /// [`extract_article`].
    pub async fn fetch_next_article(
        &self,
        source: &SourceConfig,
    ) -> Result<ArticleDraft, ScraperError> {
        let listing = self.fetch_html(&source.listing_url).await?;
        let article_url = select_article_link(&listing, &source.listing_url, &source.link)?;
        tracing::debug!(source = %source.name, url = %article_url, "scraper: following article link");

        let page = self.fetch_html(&article_url).await?;
        extract_article(&page, &article_url, source)
    }
}

fn validate_url(url: &str) -> Result<(), ScraperError> {
    let parsed = url::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if matches!(parsed.scheme(), "http" | "https") {
        Ok(())
    } else {
        Err(ScraperError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
