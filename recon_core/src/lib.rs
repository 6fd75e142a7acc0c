// src/lib.rs
pub mod config;
pub mod error;
pub mod federated;
pub mod record;
pub mod sources;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::config::{build_http_client, CredentialField, Credentials};
pub use crate::error::{ConfigError, SearchError, SourceError};
pub use crate::federated::{FederatedSearch, SearchOutcome, SearchReport};
pub use crate::record::UrlRecord;

/// Broad family a source belongs to, used for listings only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    CertificateTransparency,
    UrlScan,
    PassiveDns,
    WebArchive,
    ThreatIntel,
    CrawlIndex,
    HostScan,
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceCategory::CertificateTransparency => "certificate transparency",
            SourceCategory::UrlScan => "url scan",
            SourceCategory::PassiveDns => "passive dns",
            SourceCategory::WebArchive => "web archive",
            SourceCategory::ThreatIntel => "threat intel",
            SourceCategory::CrawlIndex => "crawl index",
            SourceCategory::HostScan => "host scan",
        };
        f.write_str(label)
    }
}

#[async_trait]
pub trait Source: Send + Sync {
    /// Unique tag of the source. Appears in every record it produces and in
    /// its error strings.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn category(&self) -> SourceCategory;

    /// Environment variables the source needs before it is scheduled.
    fn required_credentials(&self) -> &'static [CredentialField] {
        &[]
    }

    /// Whether every required credential is present and non-empty.
    ///
    /// Must not perform I/O; the selector calls it on every request.
    fn is_configured(&self) -> bool {
        true
    }

    /// Deadline the executor applies to one `search` call.
    fn timeout(&self) -> Duration {
        Duration::from_secs(20)
    }

    /// Run one logical query for `keyword` and map the payload into records.
    ///
    /// URLs are unique within the returned vector.
    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError>;
}

/// Listing entry for one registered source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub name: String,
    pub description: String,
    pub category: SourceCategory,
    pub required_env: Vec<&'static str>,
    pub configured: bool,
    pub timeout_ms: u64,
}

/// All known sources in merge priority order.
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        SourceRegistry {
            sources: Vec::new(),
        }
    }

    pub fn from_sources(sources: Vec<Arc<dyn Source>>) -> Self {
        let mut registry = Self::new();
        for source in sources {
            registry.register_arc(source);
        }
        registry
    }

    /// Append a source at the lowest priority. A source registered under an
    /// existing name replaces it in place.
    pub fn register_arc(&mut self, source: Arc<dyn Source>) {
        match self.sources.iter().position(|s| s.name() == source.name()) {
            Some(idx) => self.sources[idx] = source,
            None => self.sources.push(source),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Source>> {
        self.sources.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn list(&self) -> Vec<SourceInfo> {
        self.sources
            .iter()
            .map(|s| SourceInfo {
                name: s.name().to_string(),
                description: s.description().to_string(),
                category: s.category(),
                required_env: s.required_credentials().iter().map(|c| c.env).collect(),
                configured: s.is_configured(),
                timeout_ms: s.timeout().as_millis() as u64,
            })
            .collect()
    }

    /// Sources to schedule for a request: every configured source, in
    /// priority order. Pure; no I/O.
    pub fn eligible(&self) -> Vec<Arc<dyn Source>> {
        self.sources
            .iter()
            .filter(|s| s.is_configured())
            .map(Arc::clone)
            .collect()
    }

    /// Restrict the eligible set to `names`. Blank names are ignored and an
    /// empty list selects everything eligible. A known but unconfigured
    /// source is dropped silently, the same as in [`eligible`](Self::eligible).
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn Source>>, SearchError> {
        let wanted: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .collect();

        if wanted.is_empty() {
            return Ok(self.eligible());
        }

        if let Some(unknown) = wanted.iter().find(|n| self.get(n).is_none()) {
            return Err(SearchError::UnknownSource(unknown.to_string()));
        }

        Ok(self
            .eligible()
            .into_iter()
            .filter(|s| wanted.contains(&s.name()))
            .collect())
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the registry of all nine sources in merge priority order.
///
/// Credential-gated sources are always registered; missing credentials only
/// keep them out of [`SourceRegistry::eligible`].
pub fn build_registry(credentials: &Credentials, client: reqwest::Client) -> SourceRegistry {
    use crate::sources::*;

    let sources: Vec<Arc<dyn Source>> = vec![
        Arc::new(crtsh::CrtShSource::new(client.clone())),
        Arc::new(censys::CensysSource::new(
            client.clone(),
            credentials.censys_api_id.clone(),
            credentials.censys_api_secret.clone(),
        )),
        Arc::new(shodan::ShodanSource::new(
            client.clone(),
            credentials.shodan_api_key.clone(),
        )),
        Arc::new(urlscan::UrlScanSource::new(client.clone())),
        Arc::new(alienvault::AlienVaultSource::new(client.clone())),
        Arc::new(hackertarget::HackerTargetSource::new(client.clone())),
        Arc::new(rapiddns::RapidDnsSource::new(client.clone())),
        Arc::new(wayback::WaybackSource::new(client.clone())),
        Arc::new(commoncrawl::CommonCrawlSource::new(client)),
    ];

    SourceRegistry::from_sources(sources)
}
