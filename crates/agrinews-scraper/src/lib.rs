//! Source adapters: fetch a listing page, follow the newest article link and
//! extract an [`ArticleDraft`](agrinews_core::ArticleDraft) using the
//! selectors declared for each source.

pub mod client;
pub mod error;
pub mod extract;

pub use client::NewsClient;
pub use error::ScraperError;
pub use extract::{extract_article, select_article_link};
