//! Declarative news source definitions loaded from `config/sources.yaml`.
//!
//! Each source describes how to find the newest article on a listing page and
//! which CSS selectors hold the article's title, body paragraphs and lead
//! image. Adding a site means adding an entry, not code.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How the article link is chosen on a source's listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pick", rename_all = "snake_case")]
pub enum LinkPick {
    /// The `index`-th (0-based) element matching `selector`, in document order.
    Nth {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    /// The link of the first element matching `block_selector` that
    /// contains (or is wrapped by) a `selector` match, typically the figure
    /// around the lead story. Blocks without a link are skipped.
    FirstInBlock {
        block_selector: String,
        #[serde(default = "default_block_link_selector")]
        selector: String,
    },
}

fn default_block_link_selector() -> String {
    "a[href]".to_string()
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub listing_url: String,
    pub link: LinkPick,
    pub title_selector: String,
    /// Selects paragraph-level elements inside the article's main container,
    /// e.g. `article p`.
    pub body_selector: String,
    pub image_selector: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl SourceConfig {
    /// Generate a URL-safe slug from the source name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    fn selectors(&self) -> Vec<(&'static str, &str)> {
        let mut selectors = match &self.link {
            LinkPick::Nth { selector, .. } => vec![("link.selector", selector.as_str())],
            LinkPick::FirstInBlock {
                block_selector,
                selector,
            } => vec![
                ("link.block_selector", block_selector.as_str()),
                ("link.selector", selector.as_str()),
            ],
        };
        selectors.push(("title_selector", self.title_selector.as_str()));
        selectors.push(("body_selector", self.body_selector.as_str()));
        if let Some(image) = &self.image_selector {
            selectors.push(("image_selector", image.as_str()));
        }
        selectors
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    /// Sources that participate in ingestion cycles.
    pub fn enabled(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter().filter(|s| s.enabled)
    }

    /// Looks up a source by slug, regardless of its `enabled` flag.
    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.slug() == slug)
    }
}

/// Load and validate source definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

/// Parse and validate source definitions from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let sources_file: SourcesFile = serde_yaml::from_str(content)?;
    validate_sources(&sources_file)?;
    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        let slug = source.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' produces an empty slug",
                source.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source slug: '{}' (from source '{}')",
                slug, source.name
            )));
        }

        match url::Url::parse(&source.listing_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(ConfigError::Validation(format!(
                    "source '{}' listing_url must be http(s), got scheme '{}'",
                    source.name,
                    parsed.scheme()
                )));
            }
            Err(e) => {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has invalid listing_url '{}': {e}",
                    source.name, source.listing_url
                )));
            }
        }

        for (field, selector) in source.selectors() {
            if selector.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has an empty {field}",
                    source.name
                )));
            }
            if let Err(e) = scraper::Selector::parse(selector) {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has invalid {field} '{selector}': {e}",
                    source.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
