//! The memory store — ingestion write path, search, visits, and rebuilds.
//!
//! [`MemoryStore`] owns the vector index and chunk ledger behind a single
//! `RwLock`, so searches see a consistent snapshot and writers never
//! interleave. Embedding calls always run with no lock held; the ingestion
//! append re-checks the dedup set under the write lock so racing ingests of
//! the same text cannot duplicate a chunk.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::EngramConfig;
use crate::embedding::{self, EmbeddingProvider};
use crate::error::{EngramError, Result};
use crate::extract::TextExtractor;
use crate::memory::chunker::chunk_windows;
use crate::memory::types::{
    snippet_of, BatchIngestOutcome, ChunkRecord, Hit, IndexOutcome, ReembedOutcome, StoreStats,
    VisitOutcome, SNIPPET_CHARS,
};
use crate::memory::{search, visits};
use crate::storage::{ledger, vector::VectorIndex, StorePaths};

/// The vector index and its positionally-aligned ledger. Every mutation
/// keeps `index.len() == ledger.len()`.
struct IndexState {
    index: VectorIndex,
    ledger: Vec<ChunkRecord>,
}

/// Retrieval-augmented memory store over one data directory.
pub struct MemoryStore {
    state: RwLock<IndexState>,
    provider: Box<dyn EmbeddingProvider>,
    config: EngramConfig,
    paths: StorePaths,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("config", &self.config)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Open the store at the configured data directory, constructing the
    /// embedding provider from config.
    pub fn open(config: EngramConfig) -> Result<Self> {
        let provider =
            embedding::create_provider(&config.embedding).map_err(EngramError::Provider)?;
        Self::with_provider(config, provider)
    }

    /// Open the store with an injected provider (used by tests and callers
    /// that construct their own).
    pub fn with_provider(
        config: EngramConfig,
        provider: Box<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let paths = StorePaths::create(&config.resolved_data_dir())?;
        let index = VectorIndex::load(&paths.index)?;
        let records = ledger::load(&paths.ledger)?;

        if index.len() != records.len() {
            return Err(EngramError::CorruptIndex {
                path: paths.index.display().to_string(),
                reason: format!(
                    "index has {} rows but ledger has {} records",
                    index.len(),
                    records.len()
                ),
            });
        }

        info!(chunks = records.len(), dim = ?index.dim(), "memory store loaded");
        Ok(Self {
            state: RwLock::new(IndexState {
                index,
                ledger: records,
            }),
            provider,
            config,
            paths,
        })
    }

    /// Chunk → dedup → embed → append. Idempotent: re-ingesting identical
    /// `(url, offset, text)` is a no-op and the provider is not called.
    pub fn index_document(&self, url: &str, title: &str, text: &str) -> Result<IndexOutcome> {
        let timestamp = Utc::now().to_rfc3339();
        let base = doc_hash(url);

        // 1. Snapshot the dedup set and inherited popularity.
        let (existing, visits_init) = {
            let state = self.state.read();
            let existing: HashSet<String> = state
                .ledger
                .iter()
                .map(|r| r.chunk_hash.clone())
                .collect();
            let visits_init = state
                .ledger
                .iter()
                .filter(|r| r.url == url)
                .map(|r| r.visits)
                .max()
                .unwrap_or(1)
                .max(1);
            (existing, visits_init)
        };

        // 2. Chunk, skip known hashes, cap new chunks.
        let chunking = &self.config.chunking;
        let mut rows: Vec<ChunkRecord> = Vec::new();
        for (offset, chunk) in chunk_windows(text, chunking.chunk_size, chunking.chunk_overlap) {
            let hash = chunk_hash(url, offset, chunk);
            if existing.contains(&hash) {
                continue;
            }
            if rows.len() >= chunking.max_chunks_per_doc {
                debug!(url, cap = chunking.max_chunks_per_doc, "chunk cap reached, dropping remainder");
                break;
            }
            rows.push(ChunkRecord {
                url: url.to_string(),
                title: title.to_string(),
                timestamp: timestamp.clone(),
                chunk_id: format!("{base}#c{:04}", rows.len()),
                offset_start: offset,
                snippet: snippet_of(chunk, SNIPPET_CHARS),
                chunk_hash: hash,
                chunk_text: chunk.to_string(),
                visits: visits_init,
                last_seen: timestamp.clone(),
            });
        }

        // 3. Everything deduplicated — skip the provider entirely.
        if rows.is_empty() {
            return Ok(IndexOutcome {
                ok: true,
                indexed_chunks: 0,
                url: url.to_string(),
                title: title.to_string(),
            });
        }

        // 4. One batched provider call, no lock held.
        let texts: Vec<&str> = rows.iter().map(|r| r.chunk_text.as_str()).collect();
        let raw = self
            .provider
            .embed_batch(&texts)
            .map_err(EngramError::Provider)?;
        if raw.len() != rows.len() {
            return Err(EngramError::Provider(anyhow::anyhow!(
                "provider returned {} vectors for {} chunks",
                raw.len(),
                rows.len()
            )));
        }
        let vectors: Vec<Vec<f32>> = raw.iter().map(|v| embedding::l2_normalize(v)).collect();

        // 5. Append under the write lock, re-checking hashes that may have
        //    landed while the provider call was in flight.
        let indexed = {
            let mut state = self.state.write();
            let fresh: Vec<(ChunkRecord, Vec<f32>)> = {
                let live: HashSet<&str> =
                    state.ledger.iter().map(|r| r.chunk_hash.as_str()).collect();
                rows.into_iter()
                    .zip(vectors)
                    .filter(|(r, _)| !live.contains(r.chunk_hash.as_str()))
                    .collect()
            };
            if fresh.is_empty() {
                0
            } else {
                let (new_rows, new_vectors): (Vec<ChunkRecord>, Vec<Vec<f32>>) =
                    fresh.into_iter().unzip();
                state.index.append(&new_vectors)?;
                state.ledger.extend(new_rows);
                self.persist(&state)?;
                new_vectors.len()
            }
        };

        debug!(url, indexed, "document indexed");
        Ok(IndexOutcome {
            ok: true,
            indexed_chunks: indexed,
            url: url.to_string(),
            title: title.to_string(),
        })
    }

    /// Embed the query and return up to `top_k` hits ranked by the blended
    /// score. An empty index yields an empty result without a provider call.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<Hit>> {
        if top_k == 0 || self.state.read().index.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self.provider.embed(query).map_err(EngramError::Provider)?;
        let query_vec = embedding::l2_normalize(&raw);

        let state = self.state.read();
        let oversample = top_k.saturating_mul(self.config.ranking.oversample.max(1));
        let candidates = state.index.search(&query_vec, oversample)?;
        Ok(search::rank(
            &candidates,
            &state.ledger,
            &self.config.ranking,
            Utc::now(),
            top_k,
        ))
    }

    /// Bump popularity/recency for every chunk of `url`. `ok: false` (and no
    /// mutation) if the url was never indexed. The vector index is untouched.
    pub fn record_visit(&self, url: &str) -> Result<VisitOutcome> {
        let mut state = self.state.write();
        match visits::record_visits(&mut state.ledger, url, Utc::now()) {
            None => Ok(VisitOutcome {
                ok: false,
                url: url.to_string(),
                visits: 0,
            }),
            Some(max_visits) => {
                ledger::save(&self.paths.ledger, &state.ledger)?;
                Ok(VisitOutcome {
                    ok: true,
                    url: url.to_string(),
                    visits: max_visits,
                })
            }
        }
    }

    /// Walk `directory` recursively and index every file the extractor can
    /// convert. Hidden files are skipped; per-file failures are logged and
    /// skipped so one bad file does not abort the batch.
    pub fn batch_ingest(
        &self,
        directory: &Path,
        extractor: &dyn TextExtractor,
    ) -> Result<BatchIngestOutcome> {
        let mut indexed = 0usize;
        let mut stack = vec![directory.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };
            for entry in entries {
                let Ok(entry) = entry else { continue };
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }
                match self.ingest_file(&path, extractor) {
                    Ok(count) => indexed += count,
                    Err(e) => warn!(file = %path.display(), error = %e, "skipping file"),
                }
            }
        }

        info!(indexed, dir = %directory.display(), "batch ingest complete");
        Ok(BatchIngestOutcome {
            ok: true,
            indexed_chunks: indexed,
        })
    }

    fn ingest_file(&self, path: &Path, extractor: &dyn TextExtractor) -> anyhow::Result<usize> {
        let text = extractor.extract(path)?;
        if text.trim().is_empty() {
            return Ok(0);
        }
        let url = path.display().to_string();
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.clone());
        let outcome = self.index_document(&url, &title, &text)?;
        Ok(outcome.indexed_chunks)
    }

    /// Re-embed every ledger chunk with the current provider and replace the
    /// vector index. Administrative operation: the store is locked for the
    /// duration, including the provider call.
    pub fn re_embed(&self) -> Result<ReembedOutcome> {
        let mut state = self.state.write();
        let chunks = state.ledger.len();
        if chunks == 0 {
            return Ok(ReembedOutcome { ok: true, chunks: 0 });
        }

        let texts: Vec<&str> = state.ledger.iter().map(|r| r.chunk_text.as_str()).collect();
        let raw = self
            .provider
            .embed_batch(&texts)
            .map_err(EngramError::Provider)?;
        if raw.len() != chunks {
            return Err(EngramError::Provider(anyhow::anyhow!(
                "provider returned {} vectors for {} chunks",
                raw.len(),
                chunks
            )));
        }
        let vectors: Vec<Vec<f32>> = raw.iter().map(|v| embedding::l2_normalize(v)).collect();

        let mut rebuilt = VectorIndex::new();
        rebuilt.append(&vectors)?;
        state.index = rebuilt;
        state.index.save(&self.paths.index)?;

        info!(chunks, dim = ?state.index.dim(), "vector index rebuilt");
        Ok(ReembedOutcome { ok: true, chunks })
    }

    /// Read-only snapshot of index statistics.
    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        let documents = state
            .ledger
            .iter()
            .map(|r| r.url.as_str())
            .collect::<HashSet<&str>>()
            .len();
        StoreStats {
            documents,
            chunks: state.ledger.len(),
            dimension: state.index.dim(),
            total_visits: state.ledger.iter().map(|r| u64::from(r.visits)).sum(),
        }
    }

    /// Rewrite both files. Callers hold the write lock, so the on-disk pair
    /// always reflects one consistent state.
    fn persist(&self, state: &IndexState) -> Result<()> {
        state.index.save(&self.paths.index)?;
        ledger::save(&self.paths.ledger, &state.ledger)?;
        Ok(())
    }
}

/// First 10 hex chars of SHA-256(url) — the per-document id prefix.
fn doc_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..10].to_string()
}

/// First 16 hex chars of SHA-256(url ∥ offset ∥ chunk text) — the dedup key.
fn chunk_hash(url: &str, offset: usize, chunk: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(offset.to_string().as_bytes());
    hasher.update(chunk.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..16].to_string()
}
