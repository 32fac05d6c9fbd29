//! Retrieval-augmented memory for AI agents — chunked, embedded,
//! temporally-ranked document memory.
//!
//! Engram ingests text documents, splits them into overlapping chunks,
//! embeds each chunk, and answers similarity queries with a score that
//! blends cosine similarity with temporal signals:
//!
//! | Signal | Definition | Range |
//! |--------|------------|-------|
//! | **Similarity** | Inner product of normalized embeddings | `[-1, 1]` |
//! | **Freshness** | `exp(-ln 2 · age_days / half_life)` | `(0, 1]` |
//! | **Popularity** | `1 - exp(-visits / 3)` | `[0, 1)` |
//!
//! # Architecture
//!
//! - **Storage**: one flat binary vector index (`index.bin`) plus a
//!   line-delimited JSON chunk ledger (`metadata.jsonl`), positionally
//!   aligned, fully rewritten on every mutation
//! - **Embeddings**: HTTP providers (Ollama or OpenAI-compatible) behind the
//!   [`embedding::EmbeddingProvider`] trait; vectors are L2-normalized so
//!   inner product equals cosine similarity
//! - **Search**: exact inner-product scan, oversampled 4× and re-ranked by
//!   the freshness/popularity blend
//! - **Concurrency**: one `RwLock` around index + ledger; embedding calls
//!   run outside the lock
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`embedding`] — Text-to-vector embedding providers and normalization
//! - [`storage`] — On-disk layout: binary vector index and JSONL ledger
//! - [`memory`] — Core engine: chunking, ingestion, ranking, visits, and
//!   short-term memory
//! - [`extract`] — Text-extraction seam for batch ingestion
//! - [`error`] — Crate-level error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use engram::{EngramConfig, MemoryStore};
//!
//! # fn main() -> engram::Result<()> {
//! let store = MemoryStore::open(EngramConfig::load().unwrap())?;
//! store.index_document("doc1", "Notes", "Some long document text…")?;
//! store.record_visit("doc1")?;
//! for hit in store.search("document", 5)? {
//!     println!("{:.3}  {}  {}", hit.score, hit.url, hit.snippet);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod memory;
pub mod storage;

pub use config::EngramConfig;
pub use error::{EngramError, Result};
pub use memory::store::MemoryStore;
pub use memory::types::Hit;
