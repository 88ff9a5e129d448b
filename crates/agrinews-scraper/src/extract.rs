//! HTML extraction driven by a source's declared selectors.
//!
//! Parsing is synchronous and self-contained: [`Html`] is not `Send`, so no
//! document outlives the function that built it.

use agrinews_core::{ArticleDraft, LinkPick, SourceConfig};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::ScraperError;

const IMAGE_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];

/// Picks the article URL from a listing page according to `pick`.
///
/// Relative links are resolved against `listing_url`. Fragment-only,
/// `javascript:` and `mailto:` links are ignored.
///
/// # Errors
///
/// - [`ScraperError::InvalidUrl`] if `listing_url` is not an absolute URL.
/// - [`ScraperError::InvalidSelector`] if a configured selector does not parse.
/// - [`ScraperError::Parse`] if no candidate link exists.
pub fn select_article_link(
    html: &str,
    listing_url: &str,
    pick: &LinkPick,
) -> Result<String, ScraperError> {
    let base = parse_base(listing_url)?;
    let document = Html::parse_document(html);
    let anchor = parse_selector("a[href]")?;

    let found = match pick {
        LinkPick::Nth { selector, index } => {
            let selector = parse_selector(selector)?;
            document
                .select(&selector)
                .filter_map(|el| link_target(el, &anchor, &base))
                .nth(*index)
        }
        LinkPick::FirstInBlock {
            block_selector,
            selector,
        } => {
            let block = parse_selector(block_selector)?;
            let link = parse_selector(selector)?;
            document.select(&block).find_map(|b| {
                b.select(&link)
                    .find_map(|a| href_of(a, &base))
                    .or_else(|| enclosing_link(b, &base))
            })
        }
    };

    found.ok_or_else(|| ScraperError::parse(listing_url, missing_link_reason(pick)))
}

/// Extracts title, body, lead image and canonical link from an article page.
///
/// The body is the text of every element matching `body_selector`, each
/// whitespace-collapsed, empty ones dropped, joined with `\n` in document
/// order. A missing image is not an error.
///
/// # Errors
///
/// - [`ScraperError::InvalidUrl`] if `page_url` is not an absolute URL.
/// - [`ScraperError::InvalidSelector`] if a configured selector does not parse.
/// - [`ScraperError::Parse`] if the title or body is missing.
pub fn extract_article(
    html: &str,
    page_url: &str,
    source: &SourceConfig,
) -> Result<ArticleDraft, ScraperError> {
    let base = parse_base(page_url)?;
    let document = Html::parse_document(html);

    let title_selector = parse_selector(&source.title_selector)?;
    let title = document
        .select(&title_selector)
        .map(element_text)
        .find(|t| !t.is_empty())
        .ok_or_else(|| {
            ScraperError::parse(
                page_url,
                format!("no title matched '{}'", source.title_selector),
            )
        })?;

    let body_selector = parse_selector(&source.body_selector)?;
    let paragraphs: Vec<String> = document
        .select(&body_selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    if paragraphs.is_empty() {
        return Err(ScraperError::parse(
            page_url,
            format!("no body text matched '{}'", source.body_selector),
        ));
    }

    let image_url = match &source.image_selector {
        Some(selector) => {
            let selector = parse_selector(selector)?;
            let img = parse_selector("img")?;
            document
                .select(&selector)
                .find_map(|el| image_source(el, &img, &base))
        }
        None => None,
    }
    .or_else(|| meta_image(&document, &base));

    let source_url = canonical_link(&document, &base).unwrap_or_else(|| base.to_string());

    Ok(ArticleDraft {
        source_url,
        title,
        body_text: paragraphs.join("\n"),
        image_url,
    })
}

fn parse_base(raw: &str) -> Result<Url, ScraperError> {
    Url::parse(raw).map_err(|e| ScraperError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn missing_link_reason(pick: &LinkPick) -> String {
    match pick {
        LinkPick::Nth { selector, index } => {
            format!("no link at position {index} matching '{selector}'")
        }
        LinkPick::FirstInBlock { block_selector, .. } => {
            format!("no link inside any '{block_selector}' block")
        }
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Resolves `raw` against `base`, keeping only http(s) targets.
pub(crate) fn resolve_href(raw: &str, base: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty()
        || raw.starts_with('#')
        || raw.starts_with("javascript:")
        || raw.starts_with("mailto:")
        || raw.starts_with("data:")
    {
        return None;
    }

    let resolved = base.join(raw).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn href_of(el: ElementRef<'_>, base: &Url) -> Option<String> {
    el.value()
        .attr("href")
        .and_then(|href| resolve_href(href, base))
}

/// The element's own `href`, or the first descendant anchor's.
fn link_target(el: ElementRef<'_>, anchor: &Selector, base: &Url) -> Option<String> {
    href_of(el, base).or_else(|| el.select(anchor).find_map(|a| href_of(a, base)))
}

/// An `<a>` wrapping the block, for markup like `<a><figure>…</figure></a>`.
fn enclosing_link(el: ElementRef<'_>, base: &Url) -> Option<String> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|a| a.value().name() == "a")
        .find_map(|a| href_of(a, base))
}

fn image_source(el: ElementRef<'_>, img: &Selector, base: &Url) -> Option<String> {
    attr_image(el, base).or_else(|| el.select(img).find_map(|child| attr_image(child, base)))
}

fn attr_image(el: ElementRef<'_>, base: &Url) -> Option<String> {
    IMAGE_ATTRS
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .find_map(|src| resolve_href(src, base))
}

fn meta_image(document: &Html, base: &Url) -> Option<String> {
    let selector = Selector::parse(r#"meta[property="og:image"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|m| m.value().attr("content"))
        .find_map(|content| resolve_href(content, base))
}

fn canonical_link(document: &Html, base: &Url) -> Option<String> {
    let selector = Selector::parse(r#"link[rel="canonical"]"#).ok()?;
    document
        .select(&selector)
        .find_map(|link| href_of(link, base))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
