//! Crossref `works` search results.
//!
//! The API answers `{"message": {"items": [...]}}`. Titles and container
//! titles are usually one-element lists, dates are `date-parts` triples, and
//! abstracts carry JATS markup.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::BoardError;
use crate::feeds::UNKNOWN_SOURCE;
use crate::models::RawItem;
use crate::utils::strip_markup;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    message: Message,
}

#[derive(Debug, Default, Deserialize)]
struct Message {
    #[serde(default)]
    items: Vec<Work>,
}

#[derive(Debug, Default, Deserialize)]
struct Work {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
    #[serde(default)]
    title: Option<TextField>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "container-title", default)]
    container_title: Option<TextField>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(rename = "abstract", default)]
    abstract_text: Option<String>,
    #[serde(rename = "published-online", default)]
    published_online: Option<PartialDate>,
    #[serde(rename = "published-print", default)]
    published_print: Option<PartialDate>,
    #[serde(default)]
    published: Option<PartialDate>,
    #[serde(default)]
    created: Option<PartialDate>,
}

/// Crossref sends most text fields as lists, a few as plain strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Many(Vec<Option<String>>),
    One(String),
}

impl TextField {
    fn first(&self) -> Option<&str> {
        match self {
            TextField::Many(values) => values.first().and_then(|v| v.as_deref()),
            TextField::One(value) => Some(value.as_str()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PartialDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i64>>>,
}

impl PartialDate {
    /// `(year, month, day)` with missing month or day taken as 1.
    fn triple(&self) -> Option<(i64, i64, i64)> {
        let parts = self.date_parts.first()?;
        let year = parts.first().copied().flatten()?;
        let month = parts.get(1).copied().flatten().unwrap_or(1);
        let day = parts.get(2).copied().flatten().unwrap_or(1);
        Some((year, month, day))
    }
}

/// Build the works search URL for one query phrase.
pub fn search_url(endpoint: &Url, phrase: &str, rows: u32, mailto: Option<&str>) -> Url {
    let mut url = endpoint.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("query", phrase)
            .append_pair("rows", &rows.to_string())
            .append_pair("sort", "published")
            .append_pair("order", "desc");
        if let Some(mailto) = mailto.filter(|m| !m.is_empty()) {
            pairs.append_pair("mailto", mailto);
        }
    }
    url
}

/// Parse a Crossref works response into raw items.
///
/// # Errors
///
/// Returns [`BoardError::Json`] if the body is not valid JSON of the
/// expected shape.
pub fn parse_items(json: &str, now: DateTime<Utc>) -> Result<Vec<RawItem>, BoardError> {
    let envelope: Envelope = serde_json::from_str(json)?;
    Ok(envelope
        .message
        .items
        .into_iter()
        .map(|work| work_to_item(work, now))
        .collect())
}

fn work_to_item(work: Work, now: DateTime<Utc>) -> RawItem {
    let doi = work
        .doi
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_lowercase);

    let title = work
        .title
        .as_ref()
        .and_then(TextField::first)
        .map(strip_markup)
        .unwrap_or_default();

    let url = match work.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => url.to_string(),
        None => doi
            .as_deref()
            .map(|d| format!("https://doi.org/{d}"))
            .unwrap_or_default(),
    };

    let source = work
        .container_title
        .as_ref()
        .and_then(TextField::first)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| work.publisher.as_deref().map(str::trim).filter(|p| !p.is_empty()))
        .unwrap_or(UNKNOWN_SOURCE)
        .to_string();

    let abstract_text = work
        .abstract_text
        .as_deref()
        .map(strip_markup)
        .filter(|a| !a.is_empty());

    RawItem {
        published_at: resolve_date(&work, now),
        title,
        url,
        source,
        abstract_text,
        doi,
    }
}

/// Resolve the publication date from the first dated field, in priority order.
///
/// Years outside `[1900, now.year() + 1]` and impossible calendar dates
/// resolve to `now`.
fn resolve_date(work: &Work, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some((year, month, day)) = [
        &work.published_online,
        &work.published_print,
        &work.published,
        &work.created,
    ]
    .into_iter()
    .flatten()
    .find_map(PartialDate::triple) else {
        return now;
    };

    if !(1900..=i64::from(now.year()) + 1).contains(&year) {
        return now;
    }

    let (Ok(year), Ok(month), Ok(day)) = (i32::try_from(year), u32::try_from(month), u32::try_from(day)) else {
        return now;
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn parse_one(work: serde_json::Value) -> RawItem {
        let body = json!({ "status": "ok", "message": { "items": [work] } }).to_string();
        let mut items = parse_items(&body, now()).expect("should parse works");
        assert_eq!(items.len(), 1);
        items.remove(0)
    }

    #[test]
    fn test_full_work() {
        let item = parse_one(json!({
            "DOI": "10.1000/ABC.123",
            "title": ["Public <i>Integrity</i>   and Municipal Oversight"],
            "URL": "https://doi.org/10.1000/abc.123",
            "container-title": ["Journal of Public Ethics"],
            "publisher": "Ethics Press",
            "abstract": "<jats:p>We examine <jats:italic>graft</jats:italic> in city procurement.</jats:p>",
            "published-online": { "date-parts": [[2024, 11, 3]] },
            "published-print": { "date-parts": [[2025, 1]] },
            "created": { "date-parts": [[2024, 10, 1]] }
        }));

        assert_eq!(item.title, "Public Integrity and Municipal Oversight");
        assert_eq!(item.url, "https://doi.org/10.1000/abc.123");
        assert_eq!(item.source, "Journal of Public Ethics");
        assert_eq!(item.doi.as_deref(), Some("10.1000/abc.123"));
        assert_eq!(item.published_at, Utc.with_ymd_and_hms(2024, 11, 3, 0, 0, 0).unwrap());
        assert_eq!(
            item.abstract_text.as_deref(),
            Some("We examine graft in city procurement.")
        );
    }

    #[test]
    fn test_url_synthesized_from_doi() {
        let item = parse_one(json!({
            "DOI": "10.5555/xyz",
            "title": "Charity Governance",
            "publisher": "Nonprofit Press"
        }));
        assert_eq!(item.title, "Charity Governance");
        assert_eq!(item.url, "https://doi.org/10.5555/xyz");
        assert_eq!(item.source, "Nonprofit Press");
    }

    #[test]
    fn test_missing_everything_degrades() {
        let item = parse_one(json!({}));
        assert_eq!(item.title, "");
        assert_eq!(item.url, "");
        assert_eq!(item.source, UNKNOWN_SOURCE);
        assert_eq!(item.published_at, now());
        assert!(item.abstract_text.is_none());
        assert!(item.doi.is_none());
    }

    #[test]
    fn test_date_priority_skips_missing_fields() {
        let item = parse_one(json!({
            "title": ["x"],
            "published": { "date-parts": [[2023, 7]] },
            "created": { "date-parts": [[2022, 1, 1]] }
        }));
        assert_eq!(item.published_at, Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_date_with_null_parts_falls_through() {
        let item = parse_one(json!({
            "title": ["x"],
            "published-online": { "date-parts": [[null]] },
            "created": { "date-parts": [[2021, 2, 14]] }
        }));
        assert_eq!(item.published_at, Utc.with_ymd_and_hms(2021, 2, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_out_of_range_year_becomes_now() {
        let ancient = parse_one(json!({ "published": { "date-parts": [[1850, 1, 1]] } }));
        assert_eq!(ancient.published_at, now());

        let future = parse_one(json!({ "published": { "date-parts": [[2030, 1, 1]] } }));
        assert_eq!(future.published_at, now());

        let next_year = parse_one(json!({ "published": { "date-parts": [[2026, 3, 1]] } }));
        assert_eq!(next_year.published_at, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_impossible_calendar_date_becomes_now() {
        let item = parse_one(json!({ "published": { "date-parts": [[2024, 2, 31]] } }));
        assert_eq!(item.published_at, now());
    }

    #[test]
    fn test_missing_items_is_empty() {
        assert!(parse_items(r#"{"status":"ok","message":{}}"#, now()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(parse_items("{not json", now()), Err(BoardError::Json(_))));
    }

    #[test]
    fn test_search_url() {
        let endpoint = Url::parse("https://api.crossref.org/works").unwrap();
        let url = search_url(&endpoint, "nonprofit ethics", 40, Some("ops@example.org"));
        assert_eq!(
            url.as_str(),
            "https://api.crossref.org/works?query=nonprofit+ethics&rows=40&sort=published&order=desc&mailto=ops%40example.org"
        );

        let url = search_url(&endpoint, "ngo accountability", 20, None);
        assert!(!url.as_str().contains("mailto"));
    }
}
