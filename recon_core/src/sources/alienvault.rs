/// AlienVault OTX URL list source
///
/// URLs OTX has observed for a domain indicator, with the HTTP code seen at
/// crawl time. Free, no API key for this endpoint.
///
/// API: https://otx.alienvault.com/api/v1/indicators/domain/{keyword}/url_list
use super::{fetch, parse_json, status_error};
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://otx.alienvault.com/api/v1/indicators/domain";
const PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct UrlListResponse {
    #[serde(default)]
    url_list: Vec<OtxUrl>,
}

#[derive(Debug, Deserialize)]
struct OtxUrl {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    httpcode: Option<i64>,
}

pub struct AlienVaultSource {
    client: Client,
}

impl AlienVaultSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn collect(&self, response: UrlListResponse) -> Vec<UrlRecord> {
        let mut records = RecordSet::new();

        for entry in response.url_list.into_iter().take(PAGE_LIMIT) {
            let Some(url) = entry.url else { continue };
            let fallback = entry
                .hostname
                .filter(|h| !h.is_empty())
                .or(entry.domain)
                .unwrap_or_default();

            if let Some(mut record) = UrlRecord::new(url, fallback, self.name()) {
                // OTX uses 0 for "never fetched"
                if let Some(code) = entry.httpcode.filter(|c| *c > 0) {
                    record = record.with_info(format!("HTTP {}", code));
                }
                records.push(record);
            }
        }

        records.into_records()
    }
}

#[async_trait]
impl Source for AlienVaultSource {
    fn name(&self) -> &'static str {
        "alienvault"
    }

    fn description(&self) -> &'static str {
        "AlienVault OTX observed URLs for a domain indicator (free, no API key)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::ThreatIntel
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(20)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let url = format!(
            "{}/{}/url_list",
            BASE_URL,
            urlencoding::encode(&keyword.to_lowercase())
        );
        let limit = PAGE_LIMIT.to_string();
        let request = self
            .client
            .get(url)
            .query(&[("limit", limit.as_str()), ("page", "1")]);

        let (status, body) = fetch(request).await?;
        match status {
            s if s.is_success() => Ok(self.collect(parse_json(&body)?)),
            // Keywords that aren't a known domain indicator come back 404
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            s => Err(status_error(s, &body)),
        }
    }
}
