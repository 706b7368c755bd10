//! Error types for the search engine

use thiserror::Error;

use crate::distance::DistanceKernel;

/// Result type alias for search engine operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types that can occur in search engine operations.
///
/// Build-time errors are fatal and abort the build. Query-time errors are
/// returned per request and never affect shared read-only state.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Shape mismatch: expected {expected} bytes for {count}x{dimension} f32, got {actual}")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        count: usize,
        dimension: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot build an index over an empty corpus")]
    EmptyCorpus,

    #[error("Incompatible artifact: {reason}")]
    IncompatibleArtifact { reason: String },

    #[error("Id {id} out of range (count={count})")]
    OutOfRange { id: u32, count: usize },

    #[error("Kernel mismatch: artifact was built with {actual:?}, configured {expected:?}")]
    KernelMismatch {
        expected: DistanceKernel,
        actual: DistanceKernel,
    },

    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },
}
