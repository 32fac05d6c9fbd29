//! On-disk layout and persistence primitives.
//!
//! The store persists two files under the data directory: `index.bin` (the
//! flat vector index, [`vector`]) and `metadata.jsonl` (the chunk ledger,
//! [`ledger`]). Both are read fully into memory at open and fully rewritten
//! on every mutation, always through [`atomic_write`] so a crashed rewrite
//! never leaves a half-written file behind.

pub mod ledger;
pub mod vector;

use std::path::{Path, PathBuf};

use crate::error::Result;

const INDEX_FILE: &str = "index.bin";
const LEDGER_FILE: &str = "metadata.jsonl";

/// Resolved locations of the two store files.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub index: PathBuf,
    pub ledger: PathBuf,
}

impl StorePaths {
    /// Derive file paths under `data_dir`, creating the directory if needed.
    pub fn create(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            index: data_dir.join(INDEX_FILE),
            ledger: data_dir.join(LEDGER_FILE),
        })
    }
}

/// Write `bytes` to `path` via a temp file and rename.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_makes_directory_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep/store");
        let paths = StorePaths::create(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(paths.index, nested.join("index.bin"));
        assert_eq!(paths.ledger, nested.join("metadata.jsonl"));
    }

    #[test]
    fn atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!path.with_extension("tmp").exists());
    }
}
