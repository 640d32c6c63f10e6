//! Deduplication, ordering and per-category truncation of stories.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{OutputDocument, RawItem, Story};

/// Identity used to collapse the same item found by several queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupKey {
    /// The item's canonical URL.
    Url,
    /// The DOI when present, otherwise the URL.
    DoiOrUrl,
}

impl DedupKey {
    pub fn key_for(&self, item: &RawItem) -> String {
        match self {
            DedupKey::Url => item.url.clone(),
            DedupKey::DoiOrUrl => item.doi.clone().unwrap_or_else(|| item.url.clone()),
        }
    }
}

/// Accumulates stories for one run.
///
/// A key is recorded only when its story is accepted, so an item dropped by
/// the classifier does not shadow a later item with the same key.
#[derive(Debug)]
pub struct Aggregator {
    dedup: DedupKey,
    seen: HashSet<String>,
    stories: Vec<Story>,
}

impl Aggregator {
    pub fn new(dedup: DedupKey) -> Self {
        Self {
            dedup,
            seen: HashSet::new(),
            stories: Vec::new(),
        }
    }

    /// Whether a story with this item's key is already held.
    pub fn has_seen(&self, item: &RawItem) -> bool {
        self.seen.contains(&self.dedup.key_for(item))
    }

    /// Add a story unless its key was seen before. Returns `true` if added.
    pub fn offer(&mut self, item: &RawItem, story: Story) -> bool {
        let key = self.dedup.key_for(item);
        if !self.seen.insert(key) {
            debug!(url = %story.url, "duplicate story dropped");
            return false;
        }
        self.stories.push(story);
        true
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Sort newest first and cut each category to `max_per_category`.
    ///
    /// Ties keep insertion order. A story flagged for both categories lands
    /// in both lists.
    ///
    /// # Arguments
    ///
    /// * `max_per_category` - Upper bound on each list
    /// * `updated_at` - Generation time written to the document
    ///
    /// # Returns
    ///
    /// The [`OutputDocument`] ready to be written.
    pub fn finish(mut self, max_per_category: usize, updated_at: DateTime<Utc>) -> OutputDocument {
        self.stories.sort_by(|a, b| b.published.cmp(&a.published));

        let government = self
            .stories
            .iter()
            .filter(|s| s.government)
            .take(max_per_category)
            .cloned()
            .collect();
        let nonprofit = self
            .stories
            .iter()
            .filter(|s| s.nonprofit)
            .take(max_per_category)
            .cloned()
            .collect();

        OutputDocument {
            updated_at: updated_at.to_rfc3339(),
            government,
            nonprofit,
        }
    }
}
