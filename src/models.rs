//! Data models for feed items and the stories written to the board.
//!
//! This module defines the records that flow through the pipeline:
//! - [`Query`]: A search phrase with its default category hints
//! - [`RawItem`]: A source-agnostic item produced by a feed parser
//! - [`Story`]: A classified, display-ready item
//! - [`OutputDocument`]: The JSON snapshot written at the end of a run

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::short_title;

/// A search phrase and the categories it stands for.
///
/// The default flags are only consulted when an item found by this query
/// carries no government or nonprofit term of its own, and only under the
/// profiles that fall back to query defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub phrase: &'static str,
    pub default_government: bool,
    pub default_nonprofit: bool,
}

impl Query {
    pub const fn government(phrase: &'static str) -> Self {
        Self {
            phrase,
            default_government: true,
            default_nonprofit: false,
        }
    }

    pub const fn nonprofit(phrase: &'static str) -> Self {
        Self {
            phrase,
            default_government: false,
            default_nonprofit: true,
        }
    }
}

/// An item as produced by a feed parser, before classification.
///
/// Parsers never fail an item for missing fields; an empty `title` or `url`
/// is left for the classifier to reject.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    /// Headline or work title.
    pub title: String,
    /// Canonical link; primary identity of the item.
    pub url: String,
    /// Outlet, journal or publisher name.
    pub source: String,
    /// Publication time, normalized to UTC.
    pub published_at: DateTime<Utc>,
    /// Plain-text abstract, when the source provides one.
    pub abstract_text: Option<String>,
    /// Persistent document identifier (a DOI for research works).
    pub doi: Option<String>,
}

/// Sentiment tag attached to every story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

/// A classified story as it appears on the board.
///
/// Only the display fields are serialized. The category flags and the
/// sortable timestamp are classification state and stay internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    pub title: String,
    pub short_title: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
    pub sentiment: Sentiment,
    #[serde(skip)]
    pub published: DateTime<Utc>,
    #[serde(skip)]
    pub government: bool,
    #[serde(skip)]
    pub nonprofit: bool,
}

impl Story {
    /// Build a story from a raw item and its classification.
    pub fn new(item: &RawItem, sentiment: Sentiment, government: bool, nonprofit: bool) -> Self {
        Self {
            title: item.title.clone(),
            short_title: short_title(&item.title),
            url: item.url.clone(),
            source: item.source.clone(),
            published_at: item.published_at.to_rfc3339(),
            sentiment,
            published: item.published_at,
            government,
            nonprofit,
        }
    }
}

/// The snapshot written to disk at the end of a run.
#[derive(Debug, Serialize)]
pub struct OutputDocument {
    /// Generation time in ISO-8601.
    pub updated_at: String,
    /// Government-flagged stories, newest first.
    pub government: Vec<Story>,
    /// Nonprofit-flagged stories, newest first.
    pub nonprofit: Vec<Story>,
}
