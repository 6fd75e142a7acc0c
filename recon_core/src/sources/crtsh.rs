/// crt.sh Certificate Transparency source
///
/// Substring match on logged certificate names via crt.sh's LIKE syntax.
/// Free, no API key, slow under load.
///
/// API: https://crt.sh/?q=%keyword%&output=json
use super::{clean_hostname, fetch_text, host_record, parse_json};
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const ENDPOINT: &str = "https://crt.sh/";
const MAX_ENTRIES: usize = 300;

#[derive(Debug, Deserialize)]
struct CertEntry {
    #[serde(default)]
    issuer_name: Option<String>,
    #[serde(default)]
    name_value: Option<String>,
    #[serde(default)]
    common_name: Option<String>,
}

pub struct CrtShSource {
    client: Client,
}

impl CrtShSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn parse_response(&self, body: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let body = body.trim();
        if body.is_empty() || body == "[]" {
            return Ok(Vec::new());
        }

        let entries: Vec<CertEntry> = parse_json(body)?;
        let mut records = RecordSet::new();

        for entry in entries.into_iter().take(MAX_ENTRIES) {
            let issuer = entry.issuer_name.as_deref().and_then(issuer_common_name);

            // name_value holds newline-separated SANs; common_name is usually one of them
            let names = entry
                .name_value
                .iter()
                .flat_map(|v| v.split('\n'))
                .chain(entry.common_name.as_deref());

            for name in names {
                let Some(host) = clean_hostname(name) else {
                    continue;
                };
                if let Some(mut record) = host_record(&host, self.name()) {
                    if let Some(issuer) = &issuer {
                        record = record.with_info(format!("issuer: {}", issuer));
                    }
                    records.push(record);
                }
            }
        }

        Ok(records.into_records())
    }
}

/// `C=US, O=Let's Encrypt, CN=R3` -> `R3`, falling back to the organisation.
fn issuer_common_name(issuer: &str) -> Option<String> {
    let parts: Vec<&str> = issuer.split(',').map(str::trim).collect();
    parts
        .iter()
        .find_map(|p| p.strip_prefix("CN="))
        .or_else(|| parts.iter().find_map(|p| p.strip_prefix("O=")))
        .map(|s| s.trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl Source for CrtShSource {
    fn name(&self) -> &'static str {
        "crt.sh"
    }

    fn description(&self) -> &'static str {
        "Certificate Transparency log search via crt.sh (free, no API key)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::CertificateTransparency
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let pattern = format!("%{}%", keyword.to_lowercase());
        let request = self
            .client
            .get(ENDPOINT)
            .query(&[("q", pattern.as_str()), ("output", "json")]);

        let body = fetch_text(request).await?;
        self.parse_response(&body)
    }
}
