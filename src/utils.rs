//! Text helpers for titles, markup and log output.
//!
//! - Whitespace collapsing and display-title truncation
//! - Markup stripping for Crossref titles and JATS abstracts
//! - Log-safe truncation of response bodies

use itertools::Itertools;
use scraper::Html;

/// Maximum length, in characters, of a story's display title.
pub const SHORT_TITLE_LIMIT: usize = 95;

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

/// Build the display title for a story.
///
/// The title is whitespace-collapsed. If it is still longer than
/// [`SHORT_TITLE_LIMIT`] characters it is cut to one character less than the
/// limit, trailing whitespace is dropped, and `…` is appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(short_title("  Mayor   Indicted "), "Mayor Indicted");
/// assert!(short_title(&"x".repeat(200)).ends_with('…'));
/// ```
pub fn short_title(title: &str) -> String {
    let cleaned = collapse_whitespace(title);
    if cleaned.chars().count() <= SHORT_TITLE_LIMIT {
        return cleaned;
    }
    let head: String = cleaned.chars().take(SHORT_TITLE_LIMIT - 1).collect();
    format!("{}…", head.trim_end())
}

/// Strip markup tags (HTML or JATS) and collapse whitespace.
///
/// Entities are decoded as part of parsing, so `&amp;` comes back as `&`.
pub fn strip_markup(s: &str) -> String {
    if !s.contains('<') && !s.contains('&') {
        return collapse_whitespace(s);
    }
    let fragment = Html::parse_fragment(s);
    let text = fragment.root_element().text().join(" ");
    collapse_whitespace(&text)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}
