//! Exact brute-force search — the O(n) reference path.
//!
//! Scans every embedding, scoring in parallel with rayon. Used as ground
//! truth for recall measurements and directly usable for corpora small
//! enough that a graph index is not worth building.

use rayon::prelude::*;

use crate::distance::DistanceKernel;
use crate::error::{Result, SearchError};
use crate::graph::Neighbor;
use crate::store::VectorStore;

/// Exact k nearest neighbors of `query`, sorted ascending by (distance, id).
pub fn exact_search(
    store: &VectorStore,
    kernel: DistanceKernel,
    query: &[f32],
    k: usize,
) -> Result<Vec<Neighbor>> {
    if query.len() != store.dimension() {
        return Err(SearchError::DimensionMismatch {
            expected: store.dimension(),
            actual: query.len(),
        });
    }
    if k == 0 {
        return Ok(vec![]);
    }

    let mut scored: Vec<Neighbor> = (0..store.len() as u32)
        .into_par_iter()
        .map(|id| Ok(Neighbor::new(id, kernel.distance(query, store.get(id)?))))
        .collect::<Result<Vec<_>>>()?;

    scored.sort_unstable();
    scored.truncate(k);
    Ok(scored)
}

/// Exact search for a corpus item, excluding the item itself.
pub fn exact_search_by_id(
    store: &VectorStore,
    kernel: DistanceKernel,
    id: u32,
    k: usize,
) -> Result<Vec<Neighbor>> {
    let query = store.get(id)?;
    let mut results = exact_search(store, kernel, query, k.saturating_add(1))?;
    results.retain(|n| n.id != id);
    results.truncate(k);
    Ok(results)
}
