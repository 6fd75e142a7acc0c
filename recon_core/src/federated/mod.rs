//! Fan-out search across every selected source.
//!
//! This module provides:
//! - `FederatedSearch`: spawns one task per source, joins them all
//! - `SearchReport`: per-source results and failures, in priority order
//! - `SearchOutcome`: the merged, deduplicated payload handed to callers
//!
//! # Example
//!
//! ```ignore
//! use recon_core::{build_http_client, build_registry, Credentials, FederatedSearch};
//!
//! let registry = build_registry(&Credentials::from_env(), build_http_client()?);
//! let report = FederatedSearch::new(&registry).search("example.com").await?;
//! let outcome = report.into_outcome();
//! ```

mod engine;
mod merge;
mod types;

pub use engine::{execute_search, normalize_keyword, FederatedSearch};
pub use merge::{dedup_records, merge_records};
pub use types::{SearchOutcome, SearchReport, SourceFailure, SourceResults};
