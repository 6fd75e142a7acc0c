/// Common Crawl index source
///
/// Captures from the newest crawl index, probed once per candidate domain.
/// A bare keyword is tried against a fixed TLD list; a dotted keyword is
/// already a domain and is probed as-is. Free, no API key, slow.
///
/// API: https://index.commoncrawl.org/CC-MAIN-2024-10-index?url=*.example.com&output=json
use super::{fetch, parse_json, status_error};
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const INDEX_BASE: &str = "https://index.commoncrawl.org";
const COLLINFO_URL: &str = "https://index.commoncrawl.org/collinfo.json";
const FALLBACK_INDEX: &str = "CC-MAIN-2024-10";
const TLDS: &[&str] = &["com", "net", "org", "io", "co", "info"];
const MAX_RECORDS: usize = 100;

#[derive(Debug, Deserialize)]
struct Collection {
    id: String,
}

/// One NDJSON line of a CDX index response.
#[derive(Debug, Deserialize)]
struct IndexLine {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub struct CommonCrawlSource {
    client: Client,
}

impl CommonCrawlSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Newest index id from collinfo.json; any failure falls back to a pinned id.
    async fn latest_index(&self) -> String {
        let request = self.client.get(COLLINFO_URL);
        match fetch(request).await {
            Ok((status, body)) if status.is_success() => {
                match parse_json::<Vec<Collection>>(&body) {
                    Ok(collections) => {
                        if let Some(first) = collections.into_iter().next() {
                            return first.id;
                        }
                    }
                    Err(e) => debug!(error = %e, "collinfo.json not parseable"),
                }
            }
            Ok((status, _)) => debug!(status = status.as_u16(), "collinfo.json unavailable"),
            Err(e) => debug!(error = %e, "collinfo.json request failed"),
        }
        FALLBACK_INDEX.to_string()
    }

    async fn probe(&self, index: &str, domain: &str, limit: usize) -> Result<String, SourceError> {
        let url = format!("{}/{}-index", INDEX_BASE, index);
        let pattern = format!("*.{}", domain);
        let limit = limit.to_string();
        let request = self.client.get(url).query(&[
            ("url", pattern.as_str()),
            ("output", "json"),
            ("limit", limit.as_str()),
        ]);

        let (status, body) = fetch(request).await?;
        match status {
            s if s.is_success() => Ok(body),
            // The index answers 404 when it holds no captures for the pattern
            StatusCode::NOT_FOUND => Ok(String::new()),
            s => Err(status_error(s, &body)),
        }
    }

    fn parse_lines(&self, body: &str, records: &mut RecordSet) {
        for line in body.lines() {
            if records.len() >= MAX_RECORDS {
                break;
            }
            let line = line.trim();
            if !line.starts_with('{') {
                continue;
            }
            let Ok(entry) = serde_json::from_str::<IndexLine>(line) else {
                continue;
            };
            let Some(url) = entry.url else { continue };

            if let Some(mut record) = UrlRecord::new(url, "", self.name()) {
                if let Some(status) = entry.status.filter(|s| !s.is_empty()) {
                    record = record.with_info(format!("HTTP {}", status));
                }
                records.push(record);
            }
        }
    }
}

/// Domains to probe for a keyword.
fn candidate_domains(keyword: &str) -> Vec<String> {
    let keyword = keyword.trim().trim_matches('.').to_lowercase();
    if keyword.contains('.') {
        vec![keyword]
    } else {
        TLDS.iter().map(|tld| format!("{}.{}", keyword, tld)).collect()
    }
}

#[async_trait]
impl Source for CommonCrawlSource {
    fn name(&self) -> &'static str {
        "commoncrawl"
    }

    fn description(&self) -> &'static str {
        "Common Crawl URL index, newest crawl (free, massive dataset, can be slow)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::CrawlIndex
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let index = self.latest_index().await;
        let domains = candidate_domains(keyword);
        debug!(index = %index, probes = domains.len(), "querying crawl index");

        let mut records = RecordSet::new();
        let mut last_error = None;
        let mut succeeded = false;

        for domain in &domains {
            if records.len() >= MAX_RECORDS {
                break;
            }
            match self.probe(&index, domain, MAX_RECORDS - records.len()).await {
                Ok(body) => {
                    succeeded = true;
                    self.parse_lines(&body, &mut records);
                }
                Err(e) => {
                    warn!(source = self.name(), domain = %domain, error = %e, "index probe failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !succeeded => Err(e),
            _ => Ok(records.into_records()),
        }
    }
}
