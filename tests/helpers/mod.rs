#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use engram::config::{ChunkingConfig, EngramConfig};
use engram::embedding::EmbeddingProvider;
use engram::MemoryStore;

/// Deterministic offline embedding provider: each text maps to a unit spike
/// vector whose position is derived from the text bytes. Identical texts get
/// identical vectors (inner product 1.0); most distinct texts are orthogonal.
#[derive(Debug)]
pub struct SpikeProvider {
    pub dim: usize,
}

impl SpikeProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn spike(&self, text: &str) -> usize {
        let sum: u64 = text.bytes().map(u64::from).sum();
        (sum as usize) % self.dim
    }
}

impl EmbeddingProvider for SpikeProvider {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dim];
        v[self.spike(text)] = 1.0;
        Ok(v)
    }
}

/// Wraps a provider and counts batch calls, for asserting the provider is
/// not called on all-dedup or empty-index paths.
#[derive(Debug)]
pub struct CountingProvider {
    inner: SpikeProvider,
    pub batch_calls: Arc<AtomicUsize>,
    pub single_calls: Arc<AtomicUsize>,
}

impl CountingProvider {
    pub fn new(dim: usize) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let batch_calls = Arc::new(AtomicUsize::new(0));
        let single_calls = Arc::new(AtomicUsize::new(0));
        let provider = Self {
            inner: SpikeProvider::new(dim),
            batch_calls: batch_calls.clone(),
            single_calls: single_calls.clone(),
        };
        (provider, batch_calls, single_calls)
    }
}

impl EmbeddingProvider for CountingProvider {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        texts.iter().map(|t| self.inner.embed(t)).collect()
    }
}

/// A provider that always fails, for no-partial-mutation tests.
#[derive(Debug)]
pub struct FailingProvider;

impl EmbeddingProvider for FailingProvider {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("provider unavailable")
    }
}

/// Config rooted at `data_dir` with the stock 900/160 chunking.
pub fn test_config(data_dir: &std::path::Path) -> EngramConfig {
    let mut config = EngramConfig::default();
    config.storage.data_dir = data_dir.to_string_lossy().into_owned();
    config
}

/// Config with custom chunking knobs.
pub fn test_config_chunked(
    data_dir: &std::path::Path,
    chunk_size: usize,
    chunk_overlap: usize,
    max_chunks_per_doc: usize,
) -> EngramConfig {
    let mut config = test_config(data_dir);
    config.chunking = ChunkingConfig {
        chunk_size,
        chunk_overlap,
        max_chunks_per_doc,
    };
    config
}

/// Open a store over `data_dir` with a deterministic offline provider.
pub fn test_store(data_dir: &std::path::Path) -> MemoryStore {
    MemoryStore::with_provider(test_config(data_dir), Box::new(SpikeProvider::new(32))).unwrap()
}

/// Read the persisted ledger as raw JSON values, one per line.
pub fn read_ledger_lines(data_dir: &std::path::Path) -> Vec<serde_json::Value> {
    let path = data_dir.join("metadata.jsonl");
    if !path.exists() {
        return Vec::new();
    }
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

/// A 2000-character document with enough variety that neighboring windows
/// differ.
pub fn sample_text() -> String {
    (0..2000u32)
        .map(|i| char::from(b'a' + (i % 17) as u8))
        .collect()
}

/// Opt-in log output for debugging test runs:
/// `ENGRAM_TEST_LOG=debug cargo test`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("ENGRAM_TEST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
