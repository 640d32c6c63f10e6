//! Sequential driver: query set → fetch → parse → classify → aggregate.
//!
//! Queries run one after another in declared order. A query whose fetch or
//! parse fails is logged and skipped; it never aborts the run.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::aggregate::Aggregator;
use crate::error::BoardError;
use crate::fetch::FetchAsync;
use crate::models::{OutputDocument, Query, RawItem};
use crate::profiles::Profile;
use crate::utils::truncate_for_log;

/// What happened to one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub phrase: &'static str,
    /// Items parsed from the response.
    pub fetched: usize,
    /// Stories accepted into the aggregate.
    pub kept: usize,
    /// Fetch or parse failure, if the query was skipped.
    pub error: Option<String>,
}

/// Result of a full profile run.
#[derive(Debug)]
pub struct RunReport {
    pub document: OutputDocument,
    pub outcomes: Vec<QueryOutcome>,
}

impl RunReport {
    pub fn failed_queries(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}

/// Run every query of `profile` and build the output document.
///
/// Queries are fetched in declared order. A failed query is recorded in the
/// report and skipped.
///
/// # Arguments
///
/// * `fetcher` - Transport used for every request
/// * `profile` - Queries, feed format and classification policy
/// * `max_per_category` - Cap applied to each output list
/// * `now` - Run start, used for items with a missing or invalid date
///
/// # Returns
///
/// A [`RunReport`] whose document is stamped with the time it was built,
/// plus one [`QueryOutcome`] per query.
#[instrument(level = "info", skip_all, fields(profile = profile.name.as_str()))]
pub async fn run<F: FetchAsync>(
    fetcher: &F,
    profile: &Profile,
    max_per_category: usize,
    now: DateTime<Utc>,
) -> RunReport {
    let responses: Vec<(Query, Result<Vec<RawItem>, BoardError>)> =
        stream::iter(profile.queries.iter().copied())
            .then(move |query| async move {
                let result = fetch_query(fetcher, profile, &query, now).await;
                (query, result)
            })
            .collect()
            .await;

    let mut aggregator = Aggregator::new(profile.dedup);
    let mut outcomes = Vec::with_capacity(responses.len());

    for (query, result) in responses {
        let items = match result {
            Ok(items) => items,
            Err(e) => {
                let error = truncate_for_log(&e.to_string(), 300);
                warn!(query = query.phrase, %error, "query failed; skipping");
                outcomes.push(QueryOutcome {
                    phrase: query.phrase,
                    fetched: 0,
                    kept: 0,
                    error: Some(error),
                });
                continue;
            }
        };

        let mut kept = 0;
        for item in &items {
            if aggregator.has_seen(item) {
                continue;
            }
            if let Some(story) = profile.classifier.classify(item, &query) {
                if aggregator.offer(item, story) {
                    kept += 1;
                }
            }
        }
        debug!(query = query.phrase, fetched = items.len(), kept, "query processed");
        outcomes.push(QueryOutcome {
            phrase: query.phrase,
            fetched: items.len(),
            kept,
            error: None,
        });
    }

    if aggregator.is_empty() {
        warn!("no stories collected");
    }
    info!(
        stories = aggregator.len(),
        failed_queries = outcomes.iter().filter(|o| o.error.is_some()).count(),
        "collected stories"
    );

    RunReport {
        document: aggregator.finish(max_per_category, Utc::now()),
        outcomes,
    }
}

async fn fetch_query<F: FetchAsync>(
    fetcher: &F,
    profile: &Profile,
    query: &Query,
    now: DateTime<Utc>,
) -> Result<Vec<RawItem>, BoardError> {
    let url = profile.feed.request_url(&profile.endpoint, query.phrase);
    let body = fetcher.fetch(url.as_str()).await?;
    profile.feed.parse(&body, now)
}
