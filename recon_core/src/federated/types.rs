//! Result types for a fan-out search.

use super::merge::merge_records;
use crate::record::UrlRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Records from one source that completed.
#[derive(Debug, Clone, Serialize)]
pub struct SourceResults {
    /// Source tag
    pub source: String,

    /// Records in the order the source produced them
    pub records: Vec<UrlRecord>,

    /// Number of records returned
    pub count: usize,

    /// Time taken by the source (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl SourceResults {
    pub fn new(source: impl Into<String>, records: Vec<UrlRecord>) -> Self {
        Self {
            source: source.into(),
            count: records.len(),
            records,
            duration_ms: None,
        }
    }

    /// Builder method to record the elapsed time.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// A source that failed, timed out, or panicked.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    /// Source tag
    pub source: String,

    /// Error message
    pub error: String,

    /// Machine-readable error class (see `SourceError::code_str`)
    pub code: String,

    /// Whether this was a timeout
    #[serde(default)]
    pub is_timeout: bool,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Everything one fan-out produced, before merging.
///
/// `completed` is in source priority order regardless of which source
/// finished first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchReport {
    /// The keyword as sent to every source
    pub keyword: String,

    /// Sources that completed successfully
    pub completed: Vec<SourceResults>,

    /// Sources that failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SourceFailure>,

    /// Wall time of the whole fan-out (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl SearchReport {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    pub fn add_source(&mut self, source: SourceResults) {
        self.completed.push(source);
    }

    pub fn add_error(
        &mut self,
        source: impl Into<String>,
        error: impl Into<String>,
        code: impl Into<String>,
        is_timeout: bool,
    ) {
        self.errors.push(SourceFailure {
            source: source.into(),
            error: error.into(),
            code: code.into(),
            is_timeout,
        });
    }

    /// Check if any sources failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if every attempted source failed.
    pub fn all_failed(&self) -> bool {
        self.completed.is_empty() && !self.errors.is_empty()
    }

    /// Records from all completed sources before cross-source dedup.
    pub fn raw_count(&self) -> usize {
        self.completed.iter().map(|s| s.count).sum()
    }

    /// Merge, dedup and assemble the caller-facing payload.
    pub fn into_outcome(self) -> SearchOutcome {
        let errors = self.errors.iter().map(|e| e.to_string()).collect();
        let results = merge_records(self.completed.into_iter().map(|s| s.records));
        SearchOutcome::assemble(results, errors)
    }
}

/// The payload returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub count: usize,
    pub results: Vec<UrlRecord>,

    /// `"<source>: <message>"` per failed source; omitted when none failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SearchOutcome {
    pub fn assemble(results: Vec<UrlRecord>, errors: Vec<String>) -> Self {
        Self {
            count: results.len(),
            results,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, source: &str) -> UrlRecord {
        UrlRecord::new(url, "", source).unwrap()
    }

    #[test]
    fn test_report_into_outcome() {
        let mut report = SearchReport::new("example.com");

        report.add_source(
            SourceResults::new(
                "crt.sh",
                vec![
                    record("https://a.example.com", "crt.sh"),
                    record("https://b.example.com", "crt.sh"),
                ],
            )
            .with_duration_ms(120),
        );
        report.add_source(SourceResults::new(
            "hackertarget",
            vec![
                record("https://b.example.com", "hackertarget"),
                record("https://c.example.com", "hackertarget"),
            ],
        ));
        report.add_error("urlscan", "Timeout after 20000ms", "timeout", true);

        assert!(report.has_errors());
        assert!(!report.all_failed());
        assert_eq!(report.raw_count(), 4);

        let outcome = report.into_outcome();
        assert_eq!(outcome.count, 3);
        assert_eq!(outcome.count, outcome.results.len());
        assert_eq!(outcome.results[1].source, "crt.sh");
        assert_eq!(
            outcome.errors,
            Some(vec!["urlscan: Timeout after 20000ms".to_string()])
        );
    }

    #[test]
    fn test_all_failed() {
        let mut report = SearchReport::new("x");
        report.add_error("crt.sh", "HTTP 502: bad gateway", "upstream_error", false);
        report.add_error("wayback", "Timeout after 30000ms", "timeout", true);
        assert!(report.all_failed());

        let outcome = report.into_outcome();
        assert_eq!(outcome.count, 0);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.errors.map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_errors_omitted_when_empty() {
        let outcome = SearchOutcome::assemble(vec![record("https://a.io", "crt.sh")], vec![]);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["count"], 1);
        assert!(json.get("errors").is_none());
        assert_eq!(json["results"][0]["url"], "https://a.io");
    }
}
