//! Fan-out execution engine.
//!
//! Runs every selected source concurrently, each under its own deadline, and
//! collects per-source results and failures.

use super::{SearchReport, SourceResults};
use crate::error::{SearchError, SourceError};
use crate::{Source, SourceRegistry};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Trim a caller-supplied keyword; absent or blank is rejected.
pub fn normalize_keyword(keyword: Option<&str>) -> Result<String, SearchError> {
    match keyword.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k.to_string()),
        _ => Err(SearchError::MissingKeyword),
    }
}

/// Engine for executing a search across the sources of a registry.
pub struct FederatedSearch<'a> {
    registry: &'a SourceRegistry,
}

impl<'a> FederatedSearch<'a> {
    pub fn new(registry: &'a SourceRegistry) -> Self {
        Self { registry }
    }

    /// Search every eligible source.
    pub async fn search(&self, keyword: &str) -> Result<SearchReport, SearchError> {
        let keyword = normalize_keyword(Some(keyword))?;
        Ok(execute_search(&keyword, self.registry.eligible()).await)
    }

    /// Search an ad-hoc subset of sources. An empty list means all eligible.
    pub async fn search_adhoc<S: AsRef<str>>(
        &self,
        keyword: &str,
        source_names: &[S],
    ) -> Result<SearchReport, SearchError> {
        let keyword = normalize_keyword(Some(keyword))?;
        let sources = self.registry.select(source_names)?;
        Ok(execute_search(&keyword, sources).await)
    }
}

/// Spawn one task per source and join them all.
///
/// Results land in the report in the order of `sources`, not completion
/// order. Never fails: errors, timeouts and panics become report entries.
pub async fn execute_search(keyword: &str, sources: Vec<Arc<dyn Source>>) -> SearchReport {
    let start = Instant::now();
    let mut report = SearchReport::new(keyword);

    info!(keyword = %keyword, sources = sources.len(), "starting search");

    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let name = source.name();
            let limit = source.timeout();
            let keyword = keyword.to_string();

            let handle = tokio::spawn(async move {
                let started = Instant::now();
                debug!(source = name, "source started");

                match timeout(limit, source.search(&keyword)).await {
                    Ok(Ok(records)) => Ok((records, started.elapsed().as_millis() as u64)),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(SourceError::Timeout(limit)),
                }
            });

            (name, handle)
        })
        .collect();

    let joined = futures::future::join_all(
        handles
            .into_iter()
            .map(|(name, handle)| async move { (name, handle.await) }),
    )
    .await;

    for (name, joined) in joined {
        let output = joined.unwrap_or_else(|e| {
            let reason = if e.is_panic() { "panicked" } else { "was cancelled" };
            Err(SourceError::Task(format!("source task {}", reason)))
        });

        match output {
            Ok((records, duration_ms)) => {
                info!(source = name, count = records.len(), duration_ms, "source completed");
                report.add_source(SourceResults::new(name, records).with_duration_ms(duration_ms));
            }
            Err(e) => {
                warn!(source = name, code = e.code_str(), error = %e, "source failed");
                report.add_error(name, e.to_string(), e.code_str(), e.is_timeout());
            }
        }
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    report.duration_ms = Some(duration_ms);
    info!(
        keyword = %keyword,
        completed = report.completed.len(),
        failed = report.errors.len(),
        records = report.raw_count(),
        duration_ms,
        "search finished"
    );

    report
}
