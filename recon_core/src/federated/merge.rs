//! Cross-source normalization.

use crate::record::UrlRecord;
use std::collections::HashSet;

/// Concatenate per-source batches in the order given, then dedup by URL.
pub fn merge_records<I>(batches: I) -> Vec<UrlRecord>
where
    I: IntoIterator<Item = Vec<UrlRecord>>,
{
    dedup_records(batches.into_iter().flatten())
}

/// Keep the first record for each URL. Idempotent.
pub fn dedup_records<I>(records: I) -> Vec<UrlRecord>
where
    I: IntoIterator<Item = UrlRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}
