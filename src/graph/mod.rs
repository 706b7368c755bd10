//! Single-layer navigable small-world graph.
//!
//! A flattened variant of the HNSW family (Malkov & Yashunin, 2016/2018):
//! one layer, a fixed entry point, and deterministic ascending-id insertion.
//! With a static corpus the hierarchy buys little over a well-pruned single
//! layer, and dropping it makes builds reproducible byte for byte.

pub mod builder;
pub mod neighbor_queue;

pub use builder::GraphBuilder;
pub use neighbor_queue::Neighbor;

use crate::distance::DistanceKernel;

/// Configuration for index construction. Explicit, no hidden globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParams {
    /// Embedding dimension the index is built for.
    pub dimension: usize,
    /// Max neighbors per node (M).
    pub max_degree: usize,
    /// Candidate-frontier width during construction.
    pub ef_construction: usize,
    /// Distance kernel, recorded in the artifact and checked at load.
    pub kernel: DistanceKernel,
}

impl BuildParams {
    /// Default parameters for the given dimension: M=16, ef_construction=128,
    /// squared Euclidean.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_degree: 16,
            ef_construction: 128,
            kernel: DistanceKernel::default(),
        }
    }
}

/// The in-memory neighbor graph over all corpus ids.
///
/// Immutable once built (or loaded from an artifact); shared read-only across
/// query threads.
#[derive(Debug)]
pub struct NavGraph {
    /// Neighbor ids per node, indexed by id. Each list is free of
    /// self-references and duplicates and no longer than `max_degree`.
    nodes: Vec<Vec<u32>>,
    /// Fixed traversal origin; the first inserted id.
    entry_point: u32,
    params: BuildParams,
}

impl NavGraph {
    pub(crate) fn with_capacity(count: usize, params: BuildParams) -> Self {
        Self {
            nodes: vec![Vec::new(); count],
            entry_point: 0,
            params,
        }
    }

    pub(crate) fn from_parts(nodes: Vec<Vec<u32>>, entry_point: u32, params: BuildParams) -> Self {
        Self {
            nodes,
            entry_point,
            params,
        }
    }

    pub(crate) fn set_neighbors(&mut self, id: u32, neighbors: Vec<u32>) {
        self.nodes[id as usize] = neighbors;
    }

    pub(crate) fn push_neighbor(&mut self, id: u32, neighbor: u32) {
        self.nodes[id as usize].push(neighbor);
    }

    /// Neighbor ids of `id`, in selection order.
    pub fn neighbors(&self, id: u32) -> &[u32] {
        &self.nodes[id as usize]
    }

    /// The fixed id traversal starts from.
    pub fn entry_point(&self) -> u32 {
        self.entry_point
    }

    /// Number of nodes (equals the corpus size).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build parameters the graph was constructed with.
    pub fn params(&self) -> &BuildParams {
        &self.params
    }

    /// The kernel this graph was built with.
    pub fn kernel(&self) -> DistanceKernel {
        self.params.kernel
    }
}
