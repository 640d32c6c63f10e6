//! Keyword classification of feed items into ethics stories.
//!
//! Every decision is a pure function of the item text and the fixed keyword
//! sets below. The two profiles differ only in how terms are matched
//! ([`MatchMode`]) and in what happens to items that name neither domain
//! ([`CategoryFallback`]).

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::models::{Query, RawItem, Sentiment, Story};

/// A fixed set of lowercase terms with its whole-word matcher compiled once.
#[derive(Debug)]
pub struct KeywordSet {
    terms: &'static [&'static str],
    whole_word: Regex,
}

impl KeywordSet {
    fn new(terms: &'static [&'static str]) -> Self {
        let pattern = format!(r"\b(?:{})\b", terms.iter().map(|t| regex::escape(t)).join("|"));
        let whole_word = Regex::new(&pattern).expect("escaped keyword alternation is a valid regex");
        Self { terms, whole_word }
    }

    /// Whether `text` (already lowercased) contains any term of the set.
    pub fn matches(&self, text: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Substring => self.terms.iter().any(|t| text.contains(t)),
            MatchMode::WholeWord => self.whole_word.is_match(text),
        }
    }
}

pub static POSITIVE_TERMS: Lazy<KeywordSet> = Lazy::new(|| {
    KeywordSet::new(&[
        "reform",
        "transparency",
        "oversight",
        "accountability",
        "improve",
        "improved",
        "improves",
        "cleaned up",
        "cleared",
        "acquitted",
        "new ethics rules",
        "adopts ethics",
    ])
});

pub static NEGATIVE_TERMS: Lazy<KeywordSet> = Lazy::new(|| {
    KeywordSet::new(&[
        "corruption",
        "graft",
        "bribery",
        "bribe",
        "fraud",
        "embezzlement",
        "kickback",
        "money laundering",
        "scandal",
        "probe",
        "investigation",
        "charged",
        "indicted",
        "convicted",
        "arrested",
        "misuse",
        "misconduct",
    ])
});

pub static GOVERNMENT_TERMS: Lazy<KeywordSet> = Lazy::new(|| {
    KeywordSet::new(&[
        "government",
        "public",
        "municipal",
        "city",
        "state",
        "federal",
        "minister",
        "senate",
        "congress",
        "parliament",
        "mayor",
        "governor",
        "agency",
        "department",
        "county",
    ])
});

pub static NONPROFIT_TERMS: Lazy<KeywordSet> = Lazy::new(|| {
    KeywordSet::new(&[
        "nonprofit",
        "non-profit",
        "charity",
        "foundation",
        "ngo",
        "not-for-profit",
        "philanthropy",
    ])
});

pub static BUSINESS_TERMS: Lazy<KeywordSet> = Lazy::new(|| {
    KeywordSet::new(&[
        "earnings",
        "quarterly results",
        "stock",
        "share price",
        "ipo",
        "merger",
        "acquisition",
        "ceo",
        "investor",
        "wall street",
    ])
});

/// How a keyword is looked up in item text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Plain substring containment (`"state"` matches `"statement"`).
    Substring,
    /// Term must sit on word boundaries.
    WholeWord,
}

/// What to do with an item that names neither a government nor a nonprofit term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFallback {
    /// Use the category hints of the query that found the item.
    QueryDefaults,
    /// Drop the item.
    Discard,
}

/// Classification outcome for an item that survives every filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub sentiment: Sentiment,
    pub government: bool,
    pub nonprofit: bool,
}

/// Keyword classifier configured with one matching mode and one fallback policy.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    mode: MatchMode,
    fallback: CategoryFallback,
}

impl Classifier {
    pub fn new(mode: MatchMode, fallback: CategoryFallback) -> Self {
        Self { mode, fallback }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn fallback(&self) -> CategoryFallback {
        self.fallback
    }

    /// Turn a raw item into a story, or `None` if the item is discarded.
    ///
    /// # Arguments
    ///
    /// * `item` - The parsed item; title and abstract are matched
    /// * `query` - The query that found it, for default categories
    ///
    /// # Returns
    ///
    /// `None` for items with an empty title or URL, business-only items,
    /// items with no sentiment term, and items left with no category.
    pub fn classify(&self, item: &RawItem, query: &Query) -> Option<Story> {
        if item.title.is_empty() || item.url.is_empty() {
            trace!(url = %item.url, "dropping item without title or url");
            return None;
        }
        let text = classification_text(item);
        let decision = self.decide(&text, query)?;
        Some(Story::new(
            item,
            decision.sentiment,
            decision.government,
            decision.nonprofit,
        ))
    }

    /// Run the filter, sentiment and category steps over lowercased text.
    pub fn decide(&self, text: &str, query: &Query) -> Option<Decision> {
        let government = GOVERNMENT_TERMS.matches(text, self.mode);
        let nonprofit = NONPROFIT_TERMS.matches(text, self.mode);

        if BUSINESS_TERMS.matches(text, self.mode) && !government && !nonprofit {
            trace!("business-only item discarded");
            return None;
        }

        let sentiment = if NEGATIVE_TERMS.matches(text, self.mode) {
            Sentiment::Negative
        } else if POSITIVE_TERMS.matches(text, self.mode) {
            Sentiment::Positive
        } else {
            return None;
        };

        if government || nonprofit {
            return Some(Decision {
                sentiment,
                government,
                nonprofit,
            });
        }

        match self.fallback {
            CategoryFallback::QueryDefaults => Some(Decision {
                sentiment,
                government: query.default_government,
                nonprofit: query.default_nonprofit,
            }),
            CategoryFallback::Discard => None,
        }
    }
}

/// Lowercased title, source and abstract joined by spaces.
pub fn classification_text(item: &RawItem) -> String {
    let mut text = format!("{} {}", item.title, item.source);
    if let Some(abstract_text) = item.abstract_text.as_deref().filter(|a| !a.is_empty()) {
        text.push(' ');
        text.push_str(abstract_text);
    }
    text.to_lowercase()
}
