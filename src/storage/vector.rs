//! Append-only flat vector index.
//!
//! Stores L2-normalized `f32` vectors in a single contiguous buffer and
//! answers queries by exact inner product over a linear scan (equivalent to
//! cosine similarity on normalized vectors). The dimension is fixed by the
//! first appended batch; appends never mutate or delete existing rows.
//!
//! Binary layout: `EGRM` magic, `u32` format version, `u32` dimension,
//! `u64` row count, then row-major little-endian `f32` data.

use std::path::Path;

use crate::error::{EngramError, Result};

const MAGIC: &[u8; 4] = b"EGRM";
const FORMAT_VERSION: u32 = 1;

/// Flat inner-product index over normalized vectors.
#[derive(Debug, Default)]
pub struct VectorIndex {
    /// Row width; `None` until the first append establishes it.
    dim: Option<usize>,
    /// Row-major vector data, `len() == rows * dim`.
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        match self.dim {
            Some(dim) if dim > 0 => self.data.len() / dim,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The established dimension, if any vectors have been appended.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    /// Append a batch of vectors. Every vector must match the store's
    /// dimension; the first batch establishes it. On error nothing is
    /// appended.
    pub fn append(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        let Some(first) = vectors.first() else {
            return Ok(());
        };
        let expected = match self.dim {
            Some(dim) => dim,
            None => {
                if first.is_empty() {
                    return Err(EngramError::DimensionMismatch {
                        expected: 1,
                        actual: 0,
                    });
                }
                first.len()
            }
        };
        for v in vectors {
            if v.len() != expected {
                return Err(EngramError::DimensionMismatch {
                    expected,
                    actual: v.len(),
                });
            }
        }

        self.dim = Some(expected);
        self.data.reserve(vectors.len() * expected);
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        Ok(())
    }

    /// Drop all rows and the established dimension. Used by re-embedding,
    /// which rebuilds the index from scratch.
    pub fn clear(&mut self) {
        self.dim = None;
        self.data.clear();
    }

    /// Exact inner-product search: the `k` best rows as `(row, score)`,
    /// descending by score with row order breaking ties.
    ///
    /// An empty index yields an empty result. A query of the wrong width
    /// against a non-empty index is a dimension error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let dim = self.dim.unwrap_or(0);
        if query.len() != dim {
            return Err(EngramError::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(dim)
            .enumerate()
            .map(|(row, vec)| {
                let score: f32 = vec.iter().zip(query).map(|(a, b)| a * b).sum();
                (row, score)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Serialize to the binary layout and write atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dim = self.dim.unwrap_or(0);
        let rows = self.len();
        let mut bytes = Vec::with_capacity(20 + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(dim as u32).to_le_bytes());
        bytes.extend_from_slice(&(rows as u64).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        super::atomic_write(path, &bytes)
    }

    /// Load from disk. A missing file is an empty index; any malformed
    /// content is a fatal [`EngramError::CorruptIndex`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let bytes = std::fs::read(path)?;
        let corrupt = |reason: String| EngramError::CorruptIndex {
            path: path.display().to_string(),
            reason,
        };

        if bytes.len() < 20 {
            return Err(corrupt(format!("file too short: {} bytes", bytes.len())));
        }
        if &bytes[0..4] != MAGIC {
            return Err(corrupt("bad magic".to_string()));
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into().expect("4-byte slice"));
        if version != FORMAT_VERSION {
            return Err(corrupt(format!("unsupported format version {version}")));
        }
        let dim = u32::from_le_bytes(bytes[8..12].try_into().expect("4-byte slice")) as usize;
        let rows = u64::from_le_bytes(bytes[12..20].try_into().expect("8-byte slice")) as usize;

        let expected_len = 20 + rows
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| corrupt("row count overflows".to_string()))?;
        if bytes.len() != expected_len {
            return Err(corrupt(format!(
                "expected {expected_len} bytes for {rows} rows of dim {dim}, got {}",
                bytes.len()
            )));
        }

        let mut data = Vec::with_capacity(rows * dim);
        for chunk in bytes[20..].chunks_exact(4) {
            let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            if !value.is_finite() {
                return Err(corrupt("non-finite vector value".to_string()));
            }
            data.push(value);
        }

        Ok(Self {
            dim: if rows > 0 { Some(dim) } else { None },
            data,
        })
    }
}
