/// Shodan DNS source
///
/// Subdomain listing with record type and value from Shodan's DNS database.
/// Requires `SHODAN_API_KEY`; unconfigured instances are never scheduled.
///
/// API: https://api.shodan.io/dns/domain/{keyword}?key=API_KEY
use super::{clean_hostname, fetch_json, host_record};
use crate::config::{CredentialField, SHODAN_API_KEY};
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.shodan.io/dns/domain";
const MAX_RECORDS: usize = 100;

const CREDENTIALS: &[CredentialField] = &[CredentialField {
    env: SHODAN_API_KEY,
}];

#[derive(Debug, Deserialize)]
struct DomainResponse {
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    subdomains: Vec<String>,
    #[serde(default)]
    data: Vec<DnsEntry>,
}

#[derive(Debug, Deserialize)]
struct DnsEntry {
    #[serde(default)]
    subdomain: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

pub struct ShodanSource {
    client: Client,
    api_key: Option<String>,
}

impl ShodanSource {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn collect(&self, keyword: &str, response: DomainResponse) -> Vec<UrlRecord> {
        let domain = response
            .domain
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| keyword.to_lowercase());
        let mut records = RecordSet::new();

        // `data` carries the record detail; `subdomains` fills in labels it lacks
        let detailed = response.data.into_iter().map(|entry| {
            let info = format!(
                "{} {}",
                entry.kind.unwrap_or_default(),
                entry.value.unwrap_or_default()
            );
            (entry.subdomain, Some(info))
        });
        let bare = response.subdomains.into_iter().map(|label| (label, None));

        for (label, info) in detailed.chain(bare) {
            if records.len() >= MAX_RECORDS {
                break;
            }
            let fqdn = if label.is_empty() {
                domain.clone()
            } else {
                format!("{}.{}", label, domain)
            };
            let Some(host) = clean_hostname(&fqdn) else {
                continue;
            };
            if let Some(mut record) = host_record(&host, self.name()) {
                if let Some(info) = info {
                    record = record.with_info(info);
                }
                records.push(record);
            }
        }

        records.into_records()
    }
}

#[async_trait]
impl Source for ShodanSource {
    fn name(&self) -> &'static str {
        "shodan"
    }

    fn description(&self) -> &'static str {
        "Shodan DNS subdomain listing (requires SHODAN_API_KEY)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::HostScan
    }

    fn required_credentials(&self) -> &'static [CredentialField] {
        CREDENTIALS
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(20)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::Authentication(format!("{} is not set", SHODAN_API_KEY)))?;

        let url = format!(
            "{}/{}",
            BASE_URL,
            urlencoding::encode(&keyword.to_lowercase())
        );
        let request = self.client.get(url).query(&[("key", api_key)]);

        let response: DomainResponse = fetch_json(request).await?;
        Ok(self.collect(keyword, response))
    }
}
