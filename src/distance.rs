//! Distance kernels for scoring embedding pairs.
//!
//! Kernels are pure functions over equal-length slices: symmetric,
//! deterministic, and free of shared state. Dimension validation happens at
//! the engine boundary, so the kernels themselves stay branch-free.
//! Lower score always means closer; ties are broken by ascending id wherever
//! results are ranked (see [`crate::graph::neighbor_queue::Neighbor`]).

use serde::{Deserialize, Serialize};

/// Distance kernels usable at build and query time.
///
/// The kernel is recorded in the artifact header; build and query must agree
/// or loading fails with `KernelMismatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceKernel {
    /// Squared Euclidean (L2^2) distance. The default.
    SquaredEuclidean,
    /// Negated dot product, so that larger similarity sorts first.
    NegativeDot,
}

impl DistanceKernel {
    /// Compute the distance between two vectors using this kernel.
    ///
    /// Both slices must have the same length; callers validate dimensions
    /// before reaching this point.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            DistanceKernel::SquaredEuclidean => squared_euclidean(a, b),
            DistanceKernel::NegativeDot => -dot_product(a, b),
        }
    }

    /// Stable numeric identifier used in the artifact header.
    pub fn id(&self) -> u32 {
        match self {
            DistanceKernel::SquaredEuclidean => 1,
            DistanceKernel::NegativeDot => 2,
        }
    }

    /// Reverse of [`DistanceKernel::id`]. Unknown identifiers come from
    /// foreign or corrupt artifacts.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(DistanceKernel::SquaredEuclidean),
            2 => Some(DistanceKernel::NegativeDot),
            _ => None,
        }
    }
}

impl Default for DistanceKernel {
    fn default() -> Self {
        DistanceKernel::SquaredEuclidean
    }
}

/// Squared Euclidean distance between two vectors.
///
/// The square root is deliberately omitted: it is monotonic and every caller
/// only compares scores.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Dot product of two vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_squared_euclidean() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_relative_eq!(squared_euclidean(&a, &b), 27.0, epsilon = 1e-5);
    }

    #[test]
    fn test_squared_euclidean_same_vector() {
        let a = [1.0, 2.0, 3.0];
        assert_relative_eq!(squared_euclidean(&a, &a), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_dot_product() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_relative_eq!(dot_product(&a, &b), 32.0, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_dot_orders_by_similarity() {
        let query = [1.0, 0.0];
        let close = [1.0, 0.1];
        let far = [-1.0, 0.0];
        let kernel = DistanceKernel::NegativeDot;
        assert!(kernel.distance(&query, &close) < kernel.distance(&query, &far));
    }

    #[test]
    fn test_symmetry() {
        let a = [0.5, -1.5, 2.0];
        let b = [3.0, 0.25, -0.75];
        for kernel in [DistanceKernel::SquaredEuclidean, DistanceKernel::NegativeDot] {
            assert_eq!(kernel.distance(&a, &b), kernel.distance(&b, &a));
        }
    }

    #[test]
    fn test_kernel_id_roundtrip() {
        for kernel in [DistanceKernel::SquaredEuclidean, DistanceKernel::NegativeDot] {
            assert_eq!(DistanceKernel::from_id(kernel.id()), Some(kernel));
        }
        assert_eq!(DistanceKernel::from_id(0), None);
        assert_eq!(DistanceKernel::from_id(99), None);
    }
}
