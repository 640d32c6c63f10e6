//! Pipeline profiles: one query set, feed and classification policy each.
//!
//! | Profile | Feed | Matching | No-domain items | Dedup key | File |
//! |---------|------|----------|-----------------|-----------|------|
//! | `news` | Google News RSS | substring | query defaults | url | `stories.json` |
//! | `research` | Crossref works | whole word | discarded | DOI, else url | `research.json` |

use std::path::PathBuf;

use clap::ValueEnum;
use url::Url;

use crate::aggregate::DedupKey;
use crate::classify::{CategoryFallback, Classifier, MatchMode};
use crate::config::Settings;
use crate::error::BoardError;
use crate::feeds::FeedKind;
use crate::models::Query;

pub const NEWS_QUERIES: &[Query] = &[
    Query::government("government ethics"),
    Query::government("public corruption"),
    Query::government("public sector graft"),
    Query::government("ethics commission investigation"),
    Query::government("city council bribery"),
    Query::government("federal corruption case"),
    Query::nonprofit("nonprofit ethics"),
    Query::nonprofit("charity corruption"),
    Query::nonprofit("charity fraud case"),
    Query::nonprofit("ngo corruption"),
    Query::nonprofit("foundation embezzlement"),
    Query::nonprofit("nonprofit governance reform"),
];

pub const RESEARCH_QUERIES: &[Query] = &[
    Query::government("public sector ethics"),
    Query::government("government corruption"),
    Query::government("public administration accountability"),
    Query::government("municipal corruption"),
    Query::government("ethics oversight public officials"),
    Query::nonprofit("nonprofit ethics"),
    Query::nonprofit("nonprofit accountability"),
    Query::nonprofit("charity fraud"),
    Query::nonprofit("ngo corruption"),
    Query::nonprofit("nonprofit governance transparency"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileName {
    /// Google News headlines
    News,
    /// Crossref scholarly works
    Research,
}

impl ProfileName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileName::News => "news",
            ProfileName::Research => "research",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            ProfileName::News => "stories.json",
            ProfileName::Research => "research.json",
        }
    }
}

/// A fully configured pipeline variant.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: ProfileName,
    pub feed: FeedKind,
    pub endpoint: Url,
    pub queries: &'static [Query],
    pub classifier: Classifier,
    pub dedup: DedupKey,
    pub output: PathBuf,
}

impl Profile {
    /// Build a profile from settings. `output` overrides the default path.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Config`] if the configured endpoint is not a URL.
    pub fn build(
        name: ProfileName,
        settings: &Settings,
        output: Option<PathBuf>,
    ) -> Result<Self, BoardError> {
        let output = output.unwrap_or_else(|| settings.output_dir.join(name.file_name()));
        let profile = match name {
            ProfileName::News => Self {
                name,
                feed: FeedKind::GoogleNewsRss,
                endpoint: Url::parse(&settings.news_endpoint)?,
                queries: NEWS_QUERIES,
                classifier: Classifier::new(MatchMode::Substring, CategoryFallback::QueryDefaults),
                dedup: DedupKey::Url,
                output,
            },
            ProfileName::Research => Self {
                name,
                feed: FeedKind::CrossrefWorks {
                    rows: settings.crossref_rows,
                    mailto: settings.mailto.clone(),
                },
                endpoint: Url::parse(&settings.research_endpoint)?,
                queries: RESEARCH_QUERIES,
                classifier: Classifier::new(MatchMode::WholeWord, CategoryFallback::Discard),
                dedup: DedupKey::DoiOrUrl,
                output,
            },
        };
        Ok(profile)
    }
}
