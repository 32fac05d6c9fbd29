//! Crate-level error taxonomy.
//!
//! Failures that abort an operation surface as [`EngramError`]. A visit for a
//! url that was never indexed is NOT an error — it is reported as a
//! structured [`VisitOutcome`](crate::memory::types::VisitOutcome) with
//! `ok: false`.

use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, EngramError>;

/// Errors surfaced by the memory store.
#[derive(Debug, Error)]
pub enum EngramError {
    /// The embedding provider call failed (network, auth, malformed
    /// response). Nothing was appended.
    #[error("embedding provider error: {0}")]
    Provider(anyhow::Error),

    /// A vector batch disagrees with the established store dimension.
    #[error("embedding dimension mismatch: store has {expected}, batch has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The metadata ledger was unreadable or malformed at load. Fatal at
    /// open — the store never silently truncates persisted data.
    #[error("corrupt ledger {path} at line {line}: {reason}")]
    CorruptLedger {
        path: String,
        line: usize,
        reason: String,
    },

    /// The vector index file was malformed, or its row count disagrees with
    /// the ledger at load.
    #[error("corrupt vector index {path}: {reason}")]
    CorruptIndex { path: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
