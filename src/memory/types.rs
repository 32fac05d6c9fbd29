//! Core record and result type definitions.
//!
//! Defines [`ChunkRecord`] (one ledger line per indexed window), [`Hit`]
//! (a ranked search result), and the `Serialize` outcome structs returned by
//! store operations so adapter layers can pass them through as JSON.

use serde::{Deserialize, Serialize};

/// Display snippet length, in characters.
pub const SNIPPET_CHARS: usize = 240;

/// A chunk record, matching one line of `metadata.jsonl`.
///
/// The record at ledger position *i* describes the vector at index row *i*;
/// the two collections never diverge in length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Stable document key (not necessarily a network URL).
    pub url: String,
    /// Display name of the source document.
    pub title: String,
    /// RFC 3339 creation timestamp. Kept as a string so a malformed value
    /// degrades to the maximally-fresh fallback at scoring time instead of
    /// poisoning the load.
    pub timestamp: String,
    /// `<doc-hash-prefix>#c<seq>`, unique per document per ingestion.
    pub chunk_id: String,
    /// Character offset of the chunk within the source text.
    pub offset_start: usize,
    /// First [`SNIPPET_CHARS`] characters of the chunk (display only).
    pub snippet: String,
    /// Dedup key: hash of `(url, offset, chunk_text)`, unique across the
    /// ledger.
    pub chunk_hash: String,
    /// Full chunk content, retained for re-embedding and debugging.
    pub chunk_text: String,
    /// Popularity counter; all chunks of a document move together.
    pub visits: u32,
    /// RFC 3339 timestamp of the last recorded visit.
    pub last_seen: String,
}

/// A ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct Hit {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub chunk_id: String,
    /// Blended score: similarity plus the freshness/popularity hybrid.
    pub score: f64,
    pub timestamp: String,
}

/// Result of an `index_document` call.
#[derive(Debug, Serialize)]
pub struct IndexOutcome {
    pub ok: bool,
    /// Chunks newly appended by this call (0 when everything deduplicated).
    pub indexed_chunks: usize,
    pub url: String,
    pub title: String,
}

/// Result of a `record_visit` call. `ok: false` means the url was never
/// indexed and nothing was mutated.
#[derive(Debug, Serialize)]
pub struct VisitOutcome {
    pub ok: bool,
    pub url: String,
    /// Maximum visit count across the document's chunks after the update.
    pub visits: u32,
}

/// Result of a `batch_ingest` call.
#[derive(Debug, Serialize)]
pub struct BatchIngestOutcome {
    pub ok: bool,
    pub indexed_chunks: usize,
}

/// Result of a `re_embed` call.
#[derive(Debug, Serialize)]
pub struct ReembedOutcome {
    pub ok: bool,
    /// Number of chunks re-embedded.
    pub chunks: usize,
}

/// Read-only index statistics.
#[derive(Debug, Serialize)]
pub struct StoreStats {
    /// Distinct urls in the ledger.
    pub documents: usize,
    pub chunks: usize,
    /// Established vector dimension, if any batch has been indexed.
    pub dimension: Option<usize>,
    pub total_visits: u64,
}

/// First `max_chars` characters of `content`, sliced on a char boundary.
pub(crate) fn snippet_of(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_record_roundtrips_as_flat_json() {
        let record = ChunkRecord {
            url: "doc1".into(),
            title: "Doc One".into(),
            timestamp: "2026-08-01T12:00:00+00:00".into(),
            chunk_id: "abc123def0#c0000".into(),
            offset_start: 0,
            snippet: "hello".into(),
            chunk_hash: "deadbeefdeadbeef".into(),
            chunk_text: "hello world".into(),
            visits: 2,
            last_seen: "2026-08-02T09:30:00+00:00".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["url"], "doc1");
        assert_eq!(json["offset_start"], 0);
        assert_eq!(json["visits"], 2);

        let back: ChunkRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.chunk_hash, record.chunk_hash);
        assert_eq!(back.chunk_text, record.chunk_text);
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        assert_eq!(snippet_of("short", 240), "short");
        assert_eq!(snippet_of("abcdef", 3), "abc");
        // multibyte chars count as one character each
        assert_eq!(snippet_of("ééééé", 3), "ééé");
    }
}
