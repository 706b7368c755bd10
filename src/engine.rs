//! The query-facing search context.
//!
//! One `SearchEngine` per corpus version: it owns the loaded vector store
//! and the loaded graph, is constructed once at process start, and is shared
//! by reference across worker threads. Nothing in it mutates after
//! construction, so queries need no locks. Swapping to a new corpus version
//! means building a new artifact out of process and constructing a fresh
//! engine — never patching a live one.

use std::path::Path;

use crate::distance::DistanceKernel;
use crate::error::{Result, SearchError};
use crate::graph::{BuildParams, GraphBuilder, NavGraph, Neighbor};
use crate::persistence;
use crate::query;
use crate::store::VectorStore;

/// Immutable pairing of a [`VectorStore`] and the [`NavGraph`] built over it.
#[derive(Debug)]
pub struct SearchEngine {
    store: VectorStore,
    graph: NavGraph,
}

impl SearchEngine {
    /// Pair a store with a graph, cross-checking corpus size, dimension, and
    /// distance kernel against `kernel` (the caller's configured kernel).
    pub fn new(store: VectorStore, graph: NavGraph, kernel: DistanceKernel) -> Result<Self> {
        if graph.kernel() != kernel {
            return Err(SearchError::KernelMismatch {
                expected: kernel,
                actual: graph.kernel(),
            });
        }
        if graph.params().dimension != store.dimension() {
            return Err(SearchError::DimensionMismatch {
                expected: graph.params().dimension,
                actual: store.dimension(),
            });
        }
        if graph.len() != store.len() {
            return Err(SearchError::IncompatibleArtifact {
                reason: format!(
                    "artifact holds {} nodes but the store holds {} embeddings",
                    graph.len(),
                    store.len()
                ),
            });
        }
        Ok(Self { store, graph })
    }

    /// Build an engine in one shot from an already-loaded store.
    pub fn build(store: VectorStore, params: BuildParams) -> Result<Self> {
        let kernel = params.kernel;
        let graph = GraphBuilder::new(params).build(&store)?;
        Self::new(store, graph, kernel)
    }

    /// Load a raw embeddings file and a persisted artifact into an engine.
    pub fn open(
        embeddings_path: impl AsRef<Path>,
        artifact_path: impl AsRef<Path>,
        count: usize,
        dimension: usize,
        kernel: DistanceKernel,
    ) -> Result<Self> {
        let store = VectorStore::load(embeddings_path, count, dimension)?;
        let graph = persistence::read_artifact(artifact_path)?;
        Self::new(store, graph, kernel)
    }

    /// Find the (approximate) `k` nearest neighbors of `query`.
    ///
    /// `ef_search` is clamped up to `k`. Results are ascending by distance,
    /// ties broken by ascending id. Fewer than `k` reachable nodes yields
    /// fewer results, not an error; `k == 0` yields an empty result.
    pub fn search(&self, query: &[f32], k: usize, ef_search: usize) -> Result<Vec<Neighbor>> {
        self.search_filtered(query, k, ef_search, None)
    }

    /// Like [`SearchEngine::search`], but the query is an id into the corpus
    /// and that id itself is excluded from the results.
    pub fn search_by_id(&self, id: u32, k: usize, ef_search: usize) -> Result<Vec<Neighbor>> {
        let query = self.store.get(id)?;
        // One extra slot since the query id will surface as its own nearest
        // neighbor and then be filtered out.
        self.search_filtered(query, k, ef_search.max(k.saturating_add(1)), Some(id))
    }

    fn search_filtered(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
        exclude: Option<u32>,
    ) -> Result<Vec<Neighbor>> {
        if query.len() != self.store.dimension() {
            return Err(SearchError::DimensionMismatch {
                expected: self.store.dimension(),
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(vec![]);
        }

        let ef = ef_search.max(k);
        let mut results = query::beam_search(&self.graph, &self.store, query, ef)?;
        if let Some(id) = exclude {
            results.retain(|n| n.id != id);
        }
        results.truncate(k);
        Ok(results)
    }

    /// Number of embeddings in the corpus.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    /// The kernel shared by build and query.
    pub fn kernel(&self) -> DistanceKernel {
        self.graph.kernel()
    }

    /// The underlying vector store.
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// The underlying graph.
    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }
}
