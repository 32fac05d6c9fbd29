//! Text-extraction collaborator for batch ingestion.
//!
//! Converting files (PDF, HTML, office formats, …) to plain text is an
//! external concern; the store only needs the [`TextExtractor`] seam. The
//! bundled [`PlainTextExtractor`] handles plain-text files.

use std::path::Path;

use anyhow::{Context, Result};

/// Converts one file into plain text for indexing.
pub trait TextExtractor: Send + Sync {
    /// Extract the text content of `path`. An empty string means the file
    /// has no indexable content and is skipped.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Reads files as (lossy) UTF-8.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_utf8_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "plain text content").unwrap();

        let text = PlainTextExtractor.extract(&path).unwrap();
        assert_eq!(text, "plain text content");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.bin");
        std::fs::write(&path, [b'o', b'k', 0xFF, b'!']).unwrap();

        let text = PlainTextExtractor.extract(&path).unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.ends_with('!'));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PlainTextExtractor.extract(&dir.path().join("absent.txt"));
        assert!(result.is_err());
    }
}
