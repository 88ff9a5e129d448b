use std::sync::LazyLock;

use regex::Regex;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\A```(?:[A-Za-z0-9_+-]*[ \t]*\r?\n|(?P<inline>[A-Za-z0-9_+-]+[ \t]+))?(?P<body>.*?)```\z",
    )
    .expect("valid regex")
});

/// Removes a surrounding Markdown code fence (with optional language tag)
/// and trims whitespace. Text without a complete fence is only trimmed.
///
/// A tag on the fence's own line is always dropped. A word sharing the line
/// with the content (```` ```json {"a":1}``` ````) is only treated as a tag
/// when a JSON object or array follows it, so ```` ```plain text``` ```` keeps
/// both words.
#[must_use]
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(caps) = FENCE_RE.captures(trimmed) else {
        return trimmed.to_string();
    };
    let body = caps.name("body").map_or("", |m| m.as_str()).trim();
    match caps.name("inline") {
        Some(tag) if !body.starts_with(['{', '[']) => format!("{}{body}", tag.as_str()),
        _ => body.to_string(),
    }
}
