//! # Kimera Search
//!
//! An approximate nearest neighbor search engine for static embedding
//! corpora: load a fixed set of vectors once, build a navigable-graph index
//! over it, persist the index as an artifact, and serve read-only top-k
//! queries with bounded latency.
//!
//! This library provides:
//! - Immutable vector storage over raw float32 embedding files
//! - Distance kernels (squared Euclidean, negative dot product)
//! - A single-layer navigable small-world graph index with diversity pruning
//! - A fixed-width, memory-mappable index artifact with atomic publish
//! - Greedy beam-search queries and an exact brute-force reference path
//!
//! ## Example
//!
//! ```rust
//! use kimera_search::{BuildParams, SearchEngine, VectorStore};
//!
//! let data = vec![
//!     0.0, 0.0,
//!     1.0, 0.0,
//!     0.0, 1.0,
//!     10.0, 10.0,
//! ];
//! let store = VectorStore::from_flat(data, 4, 2).unwrap();
//! let engine = SearchEngine::build(store, BuildParams::new(2)).unwrap();
//!
//! let neighbors = engine.search_by_id(0, 2, 16).unwrap();
//! assert_eq!(neighbors[0].id, 1);
//! assert_eq!(neighbors[1].id, 2);
//! ```

pub mod distance;
pub mod engine;
pub mod error;
pub mod exact;
pub mod graph;
pub mod metrics;
pub mod persistence;
pub mod protocol;
pub mod query;
pub mod server;
pub mod store;

pub use distance::DistanceKernel;
pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use graph::{BuildParams, GraphBuilder, NavGraph, Neighbor};
pub use persistence::{read_artifact, write_artifact};
pub use store::VectorStore;
