//! Google News RSS search results.
//!
//! Each `<item>` carries `title`, `link`, `pubDate` and an optional
//! `<source>` naming the outlet. Google appends the outlet to the headline as
//! `"Headline - Outlet"`, which is used when `<source>` is absent.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::BoardError;
use crate::feeds::UNKNOWN_SOURCE;
use crate::models::RawItem;

#[derive(Debug, Default, Deserialize)]
struct Rss {
    #[serde(default)]
    channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    source: Option<SourceTag>,
}

#[derive(Debug, Deserialize)]
struct SourceTag {
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

/// Build the search URL for one query phrase.
pub fn search_url(endpoint: &Url, phrase: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("q", phrase)
        .append_pair("hl", "en-US")
        .append_pair("gl", "US")
        .append_pair("ceid", "US:en");
    url
}

/// Parse an RSS document into raw items.
///
/// Missing fields degrade to empty strings, `now`, or [`UNKNOWN_SOURCE`].
///
/// # Errors
///
/// Returns [`BoardError::Xml`] if the document is not well-formed.
pub fn parse_items(xml: &str, now: DateTime<Utc>) -> Result<Vec<RawItem>, BoardError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;

    let items = rss
        .channel
        .items
        .into_iter()
        .map(|item| {
            let title = trimmed(item.title);
            let source = resolve_source(item.source.and_then(|s| s.name).as_deref(), &title);
            RawItem {
                url: trimmed(item.link),
                published_at: parse_pub_date(item.pub_date.as_deref(), now),
                source,
                title,
                abstract_text: None,
                doi: None,
            }
        })
        .collect();

    Ok(items)
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Pick the outlet name for an item.
///
/// Order: explicit `<source>` text, the title segment after the last
/// `" - "`, then [`UNKNOWN_SOURCE`].
pub fn resolve_source(explicit: Option<&str>, title: &str) -> String {
    if let Some(name) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    title
        .rsplit_once(" - ")
        .map(|(_, tail)| tail.trim())
        .filter(|tail| !tail.is_empty())
        .unwrap_or(UNKNOWN_SOURCE)
        .to_string()
}

/// Parse an RFC 2822 `pubDate` into UTC, falling back to `now`.
///
/// Unpadded hours (`1:02:03`) are accepted with a numeric or named zone.
/// A date without a zone is read as UTC.
pub fn parse_pub_date(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return now;
    };
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Some(dt) = parse_lenient(raw) {
        return dt;
    }
    ["%a, %d %b %Y %H:%M:%S", "%d %b %Y %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .unwrap_or(now)
}

fn parse_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let (head, zone) = raw.rsplit_once(char::is_whitespace)?;
    let candidate = format!("{head} {}", zone_offset(zone).unwrap_or(zone));
    ["%a, %d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M:%S %z"]
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&candidate, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Numeric offset for the zone names RFC 2822 allows.
fn zone_offset(name: &str) -> Option<&'static str> {
    let offset = match name.to_ascii_uppercase().as_str() {
        "UT" | "GMT" | "Z" => "+0000",
        "EDT" => "-0400",
        "EST" | "CDT" => "-0500",
        "CST" | "MDT" => "-0600",
        "MST" | "PDT" => "-0700",
        "PST" => "-0800",
        _ => return None,
    };
    Some(offset)
}
