//! Upstream feed formats.
//!
//! | Feed | Module | Format | Used by |
//! |------|--------|--------|---------|
//! | Google News search | [`rss`] | RSS 2.0 XML | `news` profile |
//! | Crossref works | [`crossref`] | JSON | `research` profile |
//!
//! Each module exports `search_url` to build one request per query and
//! `parse_items` to turn a response body into [`RawItem`]s.

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::BoardError;
use crate::models::RawItem;

pub mod crossref;
pub mod rss;

/// Source name used when a feed item names no outlet.
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// The feed a profile reads, with its request options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedKind {
    GoogleNewsRss,
    CrossrefWorks { rows: u32, mailto: Option<String> },
}

impl FeedKind {
    /// Request URL for one query phrase against `endpoint`.
    pub fn request_url(&self, endpoint: &Url, phrase: &str) -> Url {
        match self {
            FeedKind::GoogleNewsRss => rss::search_url(endpoint, phrase),
            FeedKind::CrossrefWorks { rows, mailto } => {
                crossref::search_url(endpoint, phrase, *rows, mailto.as_deref())
            }
        }
    }

    /// Parse a response body into raw items.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Xml`] or [`BoardError::Json`] for malformed bodies.
    pub fn parse(&self, body: &[u8], now: DateTime<Utc>) -> Result<Vec<RawItem>, BoardError> {
        let text = String::from_utf8_lossy(body);
        match self {
            FeedKind::GoogleNewsRss => rss::parse_items(&text, now),
            FeedKind::CrossrefWorks { .. } => crossref::parse_items(&text, now),
        }
    }
}
