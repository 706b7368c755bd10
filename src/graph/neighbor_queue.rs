//! Priority queue utilities for graph traversal — handles f32 ordering for
//! BinaryHeap and the deterministic id tie-break.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scored neighbor: an embedding id and its distance to the query.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub id: u32,
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: u32, distance: f32) -> Self {
        Self { id, distance }
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.id == other.id
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Primary order is distance; equal distances order by id so that every
// ranking in the engine is deterministic. In a max-heap bounded result set
// this evicts the larger id first, keeping the smaller one.
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A wrapper that reverses Neighbor ordering to create a min-heap.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct Reversed(Neighbor);

impl PartialOrd for Reversed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reversed {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0)
    }
}

/// Max-heap of neighbors (furthest on top). Used as the result set bounded
/// by the frontier width, so the worst entry is always O(1) to inspect.
pub struct MaxHeap {
    heap: BinaryHeap<Neighbor>,
}

impl MaxHeap {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, n: Neighbor) {
        self.heap.push(n);
    }

    /// Push and evict the furthest entry if size exceeds `limit`.
    pub fn push_bounded(&mut self, n: Neighbor, limit: usize) {
        self.heap.push(n);
        if self.heap.len() > limit {
            self.heap.pop();
        }
    }

    pub fn peek(&self) -> Option<&Neighbor> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into a Vec sorted ascending by (distance, id).
    pub fn into_sorted_vec(self) -> Vec<Neighbor> {
        let mut v: Vec<Neighbor> = self.heap.into_vec();
        v.sort_unstable();
        v
    }
}

impl Default for MaxHeap {
    fn default() -> Self {
        Self::new()
    }
}

/// Min-heap of neighbors (closest on top). Used as the candidate frontier.
pub struct MinHeap {
    heap: BinaryHeap<Reversed>,
}

impl MinHeap {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, n: Neighbor) {
        self.heap.push(Reversed(n));
    }

    pub fn pop(&mut self) -> Option<Neighbor> {
        self.heap.pop().map(|r| r.0)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for MinHeap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_heap_ordering() {
        let mut heap = MaxHeap::new();
        heap.push(Neighbor::new(0, 3.0));
        heap.push(Neighbor::new(1, 1.0));
        heap.push(Neighbor::new(2, 2.0));

        assert_eq!(heap.peek().unwrap().distance, 3.0);
    }

    #[test]
    fn test_min_heap_ordering() {
        let mut heap = MinHeap::new();
        heap.push(Neighbor::new(0, 3.0));
        heap.push(Neighbor::new(1, 1.0));
        heap.push(Neighbor::new(2, 2.0));

        assert_eq!(heap.pop().unwrap().distance, 1.0);
        assert_eq!(heap.pop().unwrap().distance, 2.0);
        assert_eq!(heap.pop().unwrap().distance, 3.0);
    }

    #[test]
    fn test_bounded_push() {
        let mut heap = MaxHeap::new();
        heap.push_bounded(Neighbor::new(0, 5.0), 2);
        heap.push_bounded(Neighbor::new(1, 1.0), 2);
        heap.push_bounded(Neighbor::new(2, 3.0), 2);

        assert_eq!(heap.len(), 2);
        let sorted = heap.into_sorted_vec();
        assert_eq!(sorted[0].distance, 1.0);
        assert_eq!(sorted[1].distance, 3.0);
    }

    #[test]
    fn test_tie_break_keeps_smaller_id() {
        // Two entries at the same distance: the bounded set must keep the
        // smaller id when one has to go.
        let mut heap = MaxHeap::new();
        heap.push_bounded(Neighbor::new(7, 1.0), 2);
        heap.push_bounded(Neighbor::new(3, 1.0), 2);
        heap.push_bounded(Neighbor::new(0, 0.5), 2);

        let sorted = heap.into_sorted_vec();
        assert_eq!(sorted[0].id, 0);
        assert_eq!(sorted[1].id, 3);
    }

    #[test]
    fn test_into_sorted_vec_tie_break() {
        let mut heap = MaxHeap::new();
        heap.push(Neighbor::new(9, 2.0));
        heap.push(Neighbor::new(4, 2.0));
        heap.push(Neighbor::new(1, 2.0));

        let sorted = heap.into_sorted_vec();
        let ids: Vec<u32> = sorted.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 4, 9]);
    }
}
