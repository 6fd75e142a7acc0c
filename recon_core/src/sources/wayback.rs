/// Wayback Machine CDX source
///
/// Two CDX queries per search: every capture under the domain
/// (`matchType=domain`) and every capture whose URL starts with the keyword
/// (`matchType=prefix`). Both result sets are concatenated, then deduplicated.
///
/// API: https://web.archive.org/cdx/search/cdx?url=example.com&matchType=domain&output=json
use super::{fetch_text, parse_json};
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

const ENDPOINT: &str = "https://web.archive.org/cdx/search/cdx";
const ROWS_PER_QUERY: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchType {
    Domain,
    Prefix,
}

impl MatchType {
    fn as_str(self) -> &'static str {
        match self {
            MatchType::Domain => "domain",
            MatchType::Prefix => "prefix",
        }
    }
}

/// One capture row: `[original, timestamp]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Capture {
    original: String,
    timestamp: String,
}

pub struct WaybackSource {
    client: Client,
}

impl WaybackSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn query(&self, keyword: &str, match_type: MatchType) -> Result<Vec<Capture>, SourceError> {
        let limit = ROWS_PER_QUERY.to_string();
        let request = self.client.get(ENDPOINT).query(&[
            ("url", keyword),
            ("matchType", match_type.as_str()),
            ("output", "json"),
            ("fl", "original,timestamp"),
            ("collapse", "urlkey"),
            ("limit", limit.as_str()),
        ]);

        let body = fetch_text(request).await?;
        parse_captures(&body)
    }

    fn to_records(&self, captures: impl IntoIterator<Item = Capture>) -> Vec<UrlRecord> {
        let mut records = RecordSet::new();

        for capture in captures {
            if !capture.original.starts_with("http") {
                continue;
            }
            if let Some(mut record) = UrlRecord::new(capture.original, "", self.name()) {
                if let Some(year) = archive_year(&capture.timestamp) {
                    record = record.with_info(format!("archived {}", year));
                }
                records.push(record);
            }
        }

        records.into_records()
    }
}

/// CDX JSON output is an array of string arrays with a header row first.
fn parse_captures(body: &str) -> Result<Vec<Capture>, SourceError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<String>> = parse_json(body)?;
    let captures = rows
        .into_iter()
        .filter(|row| row.first().map(String::as_str) != Some("original"))
        .take(ROWS_PER_QUERY)
        .filter_map(|mut row| {
            row.truncate(2);
            let timestamp = if row.len() == 2 { row.pop() } else { None };
            let original = row.pop()?;
            Some(Capture {
                original,
                timestamp: timestamp.unwrap_or_default(),
            })
        })
        .collect();

    Ok(captures)
}

/// CDX timestamps are `YYYYMMDDhhmmss`, sometimes truncated.
fn archive_year(timestamp: &str) -> Option<i32> {
    use chrono::Datelike;

    if let Ok(parsed) = NaiveDateTime::parse_from_str(timestamp, "%Y%m%d%H%M%S") {
        return Some(parsed.year());
    }
    timestamp.get(..4).and_then(|y| y.parse().ok())
}

#[async_trait]
impl Source for WaybackSource {
    fn name(&self) -> &'static str {
        "wayback"
    }

    fn description(&self) -> &'static str {
        "Wayback Machine CDX index, domain and prefix captures (free, slow)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::WebArchive
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let keyword = keyword.to_lowercase();
        let (domain, prefix) = tokio::join!(
            self.query(&keyword, MatchType::Domain),
            self.query(&keyword, MatchType::Prefix)
        );

        // One failed query degrades coverage; both failing fails the source.
        let captures = match (domain, prefix) {
            (Ok(d), Ok(p)) => d.into_iter().chain(p).collect::<Vec<_>>(),
            (Ok(d), Err(e)) => {
                warn!(source = self.name(), error = %e, "prefix query failed");
                d
            }
            (Err(e), Ok(p)) => {
                warn!(source = self.name(), error = %e, "domain query failed");
                p
            }
            (Err(e), Err(_)) => return Err(e),
        };

        Ok(self.to_records(captures))
    }
}
