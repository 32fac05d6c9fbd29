//! Visit tracking — popularity and recency metadata updates.
//!
//! A visit touches every chunk of a document (all chunks share popularity)
//! and never touches the vector index.

use chrono::{DateTime, Utc};

use crate::memory::types::ChunkRecord;

/// Increment `visits` and refresh `last_seen` on every record matching
/// `url`. Returns the maximum updated visit count, or `None` if the url has
/// no indexed chunks (no mutation in that case).
pub(crate) fn record_visits(
    ledger: &mut [ChunkRecord],
    url: &str,
    now: DateTime<Utc>,
) -> Option<u32> {
    let now_str = now.to_rfc3339();
    let mut max_visits = None;
    for record in ledger.iter_mut().filter(|r| r.url == url) {
        record.visits += 1;
        record.last_seen = now_str.clone();
        max_visits = Some(max_visits.map_or(record.visits, |m: u32| m.max(record.visits)));
    }
    max_visits
}
