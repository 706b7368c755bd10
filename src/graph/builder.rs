//! Graph construction: deterministic batch build over a static corpus.

use crate::error::{Result, SearchError};
use crate::graph::neighbor_queue::Neighbor;
use crate::graph::{BuildParams, NavGraph};
use crate::query;
use crate::store::VectorStore;

/// One-shot batch builder producing a [`NavGraph`] over the whole corpus.
///
/// Insertion order is ascending id and no randomness is involved, so two
/// builds from the same corpus and parameters produce identical graphs
/// (and byte-identical artifacts). A crash mid-build leaves nothing behind;
/// partial state only ever exists in memory.
pub struct GraphBuilder {
    params: BuildParams,
}

impl GraphBuilder {
    pub fn new(params: BuildParams) -> Self {
        Self { params }
    }

    /// Build the neighbor graph over every id in the store.
    pub fn build(&self, store: &VectorStore) -> Result<NavGraph> {
        if store.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }
        if store.dimension() != self.params.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.params.dimension,
                actual: store.dimension(),
            });
        }

        let n = store.len();
        let mut graph = NavGraph::with_capacity(n, self.params.clone());

        // Id 0 is the entry point and has no edges until 1 links to it.
        for id in 1..n as u32 {
            let vector = store.get(id)?;

            // Candidate discovery over the partial graph built so far.
            let candidates =
                query::beam_search(&graph, store, vector, self.params.ef_construction)?;

            let selected = self.select_diverse(store, vector, &candidates)?;
            graph.set_neighbors(id, selected.clone());

            // Bidirectional edges; trim any neighbor that overflows its cap.
            for &neighbor_id in &selected {
                graph.push_neighbor(neighbor_id, id);
                if graph.neighbors(neighbor_id).len() > self.params.max_degree {
                    self.trim_neighbors(&mut graph, store, neighbor_id)?;
                }
            }
        }

        Ok(graph)
    }

    /// Diversity-aware neighbor selection.
    ///
    /// Walks candidates in ascending (distance, id) order and takes each one
    /// unless it is closer to an already-selected neighbor than to the base
    /// vector; such a candidate is already well-represented and the edge
    /// would add fan-out without improving recall.
    fn select_diverse(
        &self,
        store: &VectorStore,
        base: &[f32],
        candidates: &[Neighbor],
    ) -> Result<Vec<u32>> {
        let kernel = self.params.kernel;
        let mut selected: Vec<Neighbor> = Vec::with_capacity(self.params.max_degree);

        for cand in candidates {
            if selected.len() == self.params.max_degree {
                break;
            }
            let cand_vec = store.get(cand.id)?;

            let mut dominated = false;
            for kept in &selected {
                if kernel.distance(cand_vec, store.get(kept.id)?) < cand.distance {
                    dominated = true;
                    break;
                }
            }
            if !dominated {
                selected.push(*cand);
            }
        }

        Ok(selected.into_iter().map(|n| n.id).collect())
    }

    /// Re-select a node's neighbor list after a back-link pushed it over the
    /// degree cap, applying the same diversity rule relative to that node.
    fn trim_neighbors(&self, graph: &mut NavGraph, store: &VectorStore, id: u32) -> Result<()> {
        let base = store.get(id)?;
        let kernel = self.params.kernel;

        let mut scored: Vec<Neighbor> = graph
            .neighbors(id)
            .iter()
            .map(|&nid| Ok(Neighbor::new(nid, kernel.distance(base, store.get(nid)?))))
            .collect::<Result<Vec<_>>>()?;
        scored.sort_unstable();

        let trimmed = self.select_diverse(store, base, &scored)?;
        graph.set_neighbors(id, trimmed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceKernel;
    use std::collections::HashSet;

    fn params(dimension: usize, max_degree: usize) -> BuildParams {
        BuildParams {
            dimension,
            max_degree,
            ef_construction: 32,
            kernel: DistanceKernel::SquaredEuclidean,
        }
    }

    fn grid_store(n: usize) -> VectorStore {
        // Deterministic spread without randomness
        let data: Vec<f32> = (0..n)
            .flat_map(|i| {
                [
                    (i as f32) * 0.1,
                    ((i * 7) as f32) * 0.1,
                    ((i * 13) as f32) * 0.1,
                ]
            })
            .collect();
        VectorStore::from_flat(data, n, 3).unwrap()
    }

    #[test]
    fn test_empty_corpus() {
        let store = VectorStore::from_flat(vec![], 0, 3).unwrap();
        let result = GraphBuilder::new(params(3, 4)).build(&store);
        assert!(matches!(result, Err(SearchError::EmptyCorpus)));
    }

    #[test]
    fn test_dimension_mismatch() {
        let store = grid_store(10);
        let result = GraphBuilder::new(params(5, 4)).build(&store);
        assert!(matches!(
            result,
            Err(SearchError::DimensionMismatch {
                expected: 5,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_single_node() {
        let store = VectorStore::from_flat(vec![1.0, 2.0, 3.0], 1, 3).unwrap();
        let graph = GraphBuilder::new(params(3, 4)).build(&store).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.entry_point(), 0);
        assert!(graph.neighbors(0).is_empty());
    }

    #[test]
    fn test_neighbor_invariants() {
        let store = grid_store(100);
        let p = params(3, 4);
        let graph = GraphBuilder::new(p.clone()).build(&store).unwrap();

        for id in 0..graph.len() as u32 {
            let neighbors = graph.neighbors(id);
            assert!(neighbors.len() <= p.max_degree, "degree cap exceeded");

            let unique: HashSet<u32> = neighbors.iter().copied().collect();
            assert_eq!(unique.len(), neighbors.len(), "duplicate neighbor ids");
            assert!(!unique.contains(&id), "self-reference at {}", id);
            for &nid in neighbors {
                assert!((nid as usize) < graph.len(), "dangling neighbor id");
            }
        }
    }

    #[test]
    fn test_every_node_connected() {
        let store = grid_store(50);
        let graph = GraphBuilder::new(params(3, 4)).build(&store).unwrap();

        // Every non-entry node linked to at least one earlier node at insert
        for id in 1..graph.len() as u32 {
            let reaches_or_reached = !graph.neighbors(id).is_empty()
                || (0..graph.len() as u32).any(|other| graph.neighbors(other).contains(&id));
            assert!(reaches_or_reached, "node {} is isolated", id);
        }
    }

    #[test]
    fn test_deterministic_rebuild() {
        let store = grid_store(60);
        let p = params(3, 8);
        let a = GraphBuilder::new(p.clone()).build(&store).unwrap();
        let b = GraphBuilder::new(p).build(&store).unwrap();

        assert_eq!(a.entry_point(), b.entry_point());
        for id in 0..a.len() as u32 {
            assert_eq!(a.neighbors(id), b.neighbors(id));
        }
    }

    #[test]
    fn test_diversity_prunes_redundant_edges() {
        // Three near-duplicate points near the origin and one far away: the
        // far node should not link to every duplicate.
        let data = vec![
            0.0, 0.0, //
            0.01, 0.0, //
            0.0, 0.01, //
            10.0, 10.0,
        ];
        let store = VectorStore::from_flat(data, 4, 2).unwrap();
        let graph = GraphBuilder::new(params(2, 3)).build(&store).unwrap();

        assert!(graph.neighbors(3).len() < 3);
    }
}
