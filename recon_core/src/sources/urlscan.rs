/// urlscan.io source
///
/// Full-text search over the public scan corpus; each hit contributes the
/// scanned page URL and its domain.
///
/// API: https://urlscan.io/api/v1/search/?q=keyword&size=100
use super::fetch_json;
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const ENDPOINT: &str = "https://urlscan.io/api/v1/search/";
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ScanHit>,
}

#[derive(Debug, Deserialize)]
struct ScanHit {
    #[serde(default)]
    page: Option<ScanPage>,
    #[serde(default)]
    task: Option<ScanTask>,
}

#[derive(Debug, Deserialize)]
struct ScanPage {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    status: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ScanTask {
    #[serde(default)]
    url: Option<String>,
}

pub struct UrlScanSource {
    client: Client,
}

impl UrlScanSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn collect(&self, response: SearchResponse) -> Vec<UrlRecord> {
        let mut records = RecordSet::new();

        for hit in response.results.into_iter().take(PAGE_SIZE) {
            let Some(page) = hit.page else { continue };
            // The final page URL after redirects; fall back to the submitted one
            let url = page
                .url
                .or_else(|| hit.task.and_then(|t| t.url))
                .unwrap_or_default();
            let domain = page.domain.unwrap_or_default();

            if let Some(mut record) = UrlRecord::new(url, domain, self.name()) {
                if let Some(status) = page.status.as_ref().and_then(status_text) {
                    record = record.with_info(format!("HTTP {}", status));
                }
                records.push(record);
            }
        }

        records.into_records()
    }
}

// urlscan reports status as a string ("200") on most hits, a number on some.
fn status_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl Source for UrlScanSource {
    fn name(&self) -> &'static str {
        "urlscan"
    }

    fn description(&self) -> &'static str {
        "urlscan.io public scan corpus, full-text search (free, no API key)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::UrlScan
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(20)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let size = PAGE_SIZE.to_string();
        let request = self
            .client
            .get(ENDPOINT)
            .query(&[("q", keyword), ("size", size.as_str())]);

        match fetch_json::<SearchResponse>(request).await {
            Ok(response) => Ok(self.collect(response)),
            // urlscan answers 400 for queries its search syntax can't parse
            Err(SourceError::Status { status: 400, message }) => Err(SourceError::Other(format!(
                "query rejected: {}",
                message
            ))),
            Err(e) => Err(e),
        }
    }
}
