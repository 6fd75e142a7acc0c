/// HackerTarget host search source
///
/// Passive DNS lookup returning `host,ip` CSV lines.
/// Free tier is limited per day; quota errors arrive as 200 text bodies.
///
/// API: https://api.hackertarget.com/hostsearch/?q=example.com
use super::{clean_hostname, fetch_text, host_record};
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const ENDPOINT: &str = "https://api.hackertarget.com/hostsearch/";
const MAX_LINES: usize = 200;

pub struct HackerTargetSource {
    client: Client,
}

impl HackerTargetSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn parse_response(&self, body: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let trimmed = body.trim();
        let lowered = trimmed.to_lowercase();

        if lowered.starts_with("api count exceeded") {
            return Err(SourceError::RateLimited(trimmed.to_string()));
        }
        if lowered.starts_with("error") {
            return Err(SourceError::Other(trimmed.to_string()));
        }
        if trimmed.is_empty() || lowered.starts_with("no records found") {
            return Ok(Vec::new());
        }

        let mut records = RecordSet::new();

        for line in trimmed.lines().take(MAX_LINES) {
            let mut parts = line.split(',');
            let Some(host) = parts.next().and_then(clean_hostname) else {
                continue;
            };
            let ip = parts.next().map(str::trim).unwrap_or_default();

            if let Some(record) = host_record(&host, self.name()) {
                records.push(record.with_info(ip));
            }
        }

        Ok(records.into_records())
    }
}

#[async_trait]
impl Source for HackerTargetSource {
    fn name(&self) -> &'static str {
        "hackertarget"
    }

    fn description(&self) -> &'static str {
        "HackerTarget passive DNS host search (free tier, daily quota)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::PassiveDns
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(15)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let request = self.client.get(ENDPOINT).query(&[("q", keyword)]);
        let body = fetch_text(request).await?;
        self.parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> HackerTargetSource {
        HackerTargetSource::new(Client::new())
    }

    #[test]
    fn test_parse_csv() {
        let body = "www.example.com,93.184.216.34\nmail.example.com,10.0.0.1\nwww.example.com,93.184.216.34\n\nbroken line\n";

        let records = source().parse_response(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://www.example.com");
        assert_eq!(records[0].info.as_deref(), Some("93.184.216.34"));
        assert_eq!(records[1].domain, "mail.example.com");
    }

    #[test]
    fn test_quota_and_error_bodies() {
        assert!(matches!(
            source().parse_response("API count exceeded - Increase Quota with Membership"),
            Err(SourceError::RateLimited(_))
        ));
        assert!(matches!(
            source().parse_response("error check your search parameter"),
            Err(SourceError::Other(_))
        ));
        assert!(source().parse_response("No records found").unwrap().is_empty());
    }

    #[test]
    fn test_line_cap() {
        let body: String = (0..250)
            .map(|i| format!("h{}.example.com,1.1.1.1\n", i))
            .collect();
        assert_eq!(source().parse_response(&body).unwrap().len(), MAX_LINES);
    }
}
