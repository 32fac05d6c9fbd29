//! Line-delimited JSON chunk ledger.
//!
//! One [`ChunkRecord`] per line, rewritten in full on every mutation. A line
//! that fails to parse at load is fatal — truncating the ledger silently
//! would orphan vector rows and break positional parity.

use std::io::Write;
use std::path::Path;

use crate::error::{EngramError, Result};
use crate::memory::types::ChunkRecord;

/// Load all records. A missing file is an empty ledger.
pub fn load(path: &Path) -> Result<Vec<ChunkRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: ChunkRecord =
            serde_json::from_str(line).map_err(|e| EngramError::CorruptLedger {
                path: path.display().to_string(),
                line: idx + 1,
                reason: e.to_string(),
            })?;
        records.push(record);
    }
    Ok(records)
}

/// Serialize all records as JSONL and write atomically.
pub fn save(path: &Path, records: &[ChunkRecord]) -> Result<()> {
    let mut bytes = Vec::new();
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| EngramError::CorruptLedger {
            path: path.display().to_string(),
            line: 0,
            reason: e.to_string(),
        })?;
        bytes.write_all(line.as_bytes())?;
        bytes.push(b'\n');
    }
    super::atomic_write(path, &bytes)
}
