//! Greedy beam search over the navigable graph.
//!
//! Shared by construction (candidate discovery over the partial graph) and
//! by the query engine. The frontier is bounded by `ef`, so per-query work
//! and allocation stay bounded regardless of corpus size.

use std::collections::HashSet;

use crate::error::Result;
use crate::graph::neighbor_queue::{MaxHeap, MinHeap, Neighbor};
use crate::graph::NavGraph;
use crate::store::VectorStore;

/// Search the graph for the `ef` closest nodes to `query`, starting from the
/// graph's entry point.
///
/// Maintains a visited set, a min-heap candidate frontier, and a max-heap
/// result set bounded to `ef`. Terminates when the closest unvisited
/// candidate is further than the current worst of the bounded set, or the
/// frontier is exhausted. Returns results ascending by (distance, id).
///
/// During construction the graph is partial: nodes not yet linked are
/// unreachable and simply never visited.
pub(crate) fn beam_search(
    graph: &NavGraph,
    store: &VectorStore,
    query: &[f32],
    ef: usize,
) -> Result<Vec<Neighbor>> {
    if graph.is_empty() || ef == 0 {
        return Ok(vec![]);
    }
    let kernel = graph.kernel();

    let mut visited = HashSet::new();
    let mut candidates = MinHeap::new(); // closest candidate on top
    let mut results = MaxHeap::new(); // furthest result on top

    let entry = graph.entry_point();
    let entry_dist = kernel.distance(query, store.get(entry)?);
    visited.insert(entry);
    candidates.push(Neighbor::new(entry, entry_dist));
    results.push(Neighbor::new(entry, entry_dist));

    while let Some(c) = candidates.pop() {
        // Closest candidate worse than the furthest kept result: done.
        let furthest = results.peek().map(|n| n.distance).unwrap_or(f32::MAX);
        if c.distance > furthest {
            break;
        }

        for &neighbor_id in graph.neighbors(c.id) {
            if !visited.insert(neighbor_id) {
                continue;
            }

            let dist = kernel.distance(query, store.get(neighbor_id)?);
            let furthest = results.peek().map(|n| n.distance).unwrap_or(f32::MAX);

            // <= so an exact tie still reaches push_bounded, which settles
            // it by id and keeps the smaller one.
            if dist <= furthest || results.len() < ef {
                candidates.push(Neighbor::new(neighbor_id, dist));
                results.push_bounded(Neighbor::new(neighbor_id, dist), ef);
            }
        }
    }

    Ok(results.into_sorted_vec())
}
