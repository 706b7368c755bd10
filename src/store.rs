//! Immutable vector storage over a raw embeddings file.
//!
//! The raw format is headerless: little-endian f32, row-major, exactly
//! N*D*4 bytes. N and D are supplied out of band by the caller; any byte
//! length disagreement is a fatal `ShapeMismatch`, never a silent reshape.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, SearchError};

/// Contiguous, read-only storage of N embeddings of fixed dimension D.
///
/// Loaded once at startup; afterwards safe for concurrent access from any
/// number of query threads without locking.
#[derive(Debug, Clone)]
pub struct VectorStore {
    data: Vec<f32>,
    count: usize,
    dimension: usize,
}

impl VectorStore {
    /// Load a raw embeddings file, validating its shape.
    pub fn load(path: impl AsRef<Path>, count: usize, dimension: usize) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let expected = count * dimension * 4;

        let file_len = file.metadata()?.len();
        if file_len as usize != expected {
            return Err(SearchError::ShapeMismatch {
                expected,
                actual: file_len as usize,
                count,
                dimension,
            });
        }

        let mut bytes = Vec::with_capacity(expected);
        file.read_to_end(&mut bytes)?;
        if bytes.len() != expected {
            return Err(SearchError::ShapeMismatch {
                expected,
                actual: bytes.len(),
                count,
                dimension,
            });
        }

        let data = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self {
            data,
            count,
            dimension,
        })
    }

    /// Construct a store from an in-memory flat buffer (row-major).
    pub fn from_flat(data: Vec<f32>, count: usize, dimension: usize) -> Result<Self> {
        if data.len() != count * dimension {
            return Err(SearchError::ShapeMismatch {
                expected: count * dimension * 4,
                actual: data.len() * 4,
                count,
                dimension,
            });
        }
        Ok(Self {
            data,
            count,
            dimension,
        })
    }

    /// Read-only access to the embedding for `id`.
    pub fn get(&self, id: u32) -> Result<&[f32]> {
        let idx = id as usize;
        if idx >= self.count {
            return Err(SearchError::OutOfRange {
                id,
                count: self.count,
            });
        }
        let start = idx * self.dimension;
        Ok(&self.data[start..start + self.dimension])
    }

    /// Number of embeddings.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the store holds no embeddings.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}
