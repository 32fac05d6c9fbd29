use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngramConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `index.bin` and `metadata.jsonl`.
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name: `"ollama"` or `"openai"`.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Bearer token for providers that require one. `None` falls back to the
    /// provider-specific env var at construction time.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive windows, in characters. Must be smaller
    /// than `chunk_size`; the chunker falls back to a step of 1 otherwise.
    pub chunk_overlap: usize,
    /// Hard cap on new chunks accepted per `index_document` call. Excess
    /// chunks are dropped silently.
    pub max_chunks_per_doc: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RankingConfig {
    /// Freshness half-life in days: a chunk this old scores 0.5 freshness.
    pub half_life_days: f64,
    /// Weight of raw cosine similarity in the final score.
    pub similarity_weight: f64,
    /// Weight of the freshness/popularity hybrid in the final score.
    pub temporal_weight: f64,
    /// Freshness share inside the hybrid term.
    pub freshness_weight: f64,
    /// Popularity share inside the hybrid term.
    pub popularity_weight: f64,
    /// Candidate oversampling factor before temporal re-ranking.
    pub oversample: usize,
}

impl Default for EngramConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            ranking: RankingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = default_engram_dir().to_string_lossy().into_owned();
        Self { data_dir }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            model: "nomic-embed-text".into(),
            base_url: "http://localhost:11434".into(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 900,
            chunk_overlap: 160,
            max_chunks_per_doc: 500,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            half_life_days: 30.0,
            similarity_weight: 0.75,
            temporal_weight: 0.25,
            freshness_weight: 0.6,
            popularity_weight: 0.4,
            oversample: 4,
        }
    }
}

/// Returns `~/.engram/`
pub fn default_engram_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".engram")
}

/// Returns the default config file path: `~/.engram/config.toml`
pub fn default_config_path() -> PathBuf {
    default_engram_dir().join("config.toml")
}

impl EngramConfig {
    /// Load config from the TOML file (if it exists) then apply env var
    /// overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            EngramConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (ENGRAM_DATA_DIR,
    /// ENGRAM_EMBED_PROVIDER, ENGRAM_EMBED_URL, ENGRAM_EMBED_MODEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ENGRAM_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("ENGRAM_EMBED_PROVIDER") {
            self.embedding.provider = val;
        }
        if let Ok(val) = std::env::var("ENGRAM_EMBED_URL") {
            self.embedding.base_url = val;
        }
        if let Ok(val) = std::env::var("ENGRAM_EMBED_MODEL") {
            self.embedding.model = val;
        }
    }

    /// Resolve the data directory, expanding `~` if needed.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.data_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
