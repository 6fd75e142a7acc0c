//! The normalized record every source maps its provider payload into.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// One URL discovered by a source.
///
/// `url` is the dedup key. `info` is a free-form annotation (issuer, HTTP
/// status, service, archive year) and takes no part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRecord {
    pub url: String,

    /// Hostname parsed from `url`, or the provider's own domain field when
    /// the URL does not parse. May be empty.
    pub domain: String,

    /// Tag of the source that produced this record.
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl UrlRecord {
    /// Build a record, deriving `domain` from the URL host.
    ///
    /// Returns `None` for an empty URL.
    pub fn new(
        url: impl Into<String>,
        fallback_domain: impl Into<String>,
        source: impl Into<String>,
    ) -> Option<Self> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return None;
        }
        let domain = host_of(&url).unwrap_or_else(|| fallback_domain.into());
        Some(Self {
            url,
            domain,
            source: source.into(),
            info: None,
        })
    }

    /// Builder method to attach an annotation. Blank annotations are dropped.
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        let info = info.into();
        let info = info.trim();
        self.info = if info.is_empty() {
            None
        } else {
            Some(info.to_string())
        };
        self
    }
}

impl PartialEq for UrlRecord {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.domain == other.domain && self.source == other.source
    }
}

impl Eq for UrlRecord {}

/// Lowercased host of an absolute URL.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .filter(|h| !h.is_empty())
}

/// Adapter-local accumulator that keeps the first record per key.
///
/// Scoped to one `search` call; there is no process-wide seen set.
#[derive(Debug, Default)]
pub struct RecordSet {
    seen: HashSet<String>,
    records: Vec<UrlRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keyed by the record's URL. Returns false on a duplicate.
    pub fn push(&mut self, record: UrlRecord) -> bool {
        let key = record.url.clone();
        self.push_keyed(key, record)
    }

    /// Insert under an explicit key, e.g. `host:port` for host-scan sources.
    pub fn push_keyed(&mut self, key: impl Into<String>, record: UrlRecord) -> bool {
        if self.seen.insert(key.into()) {
            self.records.push(record);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<UrlRecord> {
        self.records
    }
}
