//! k-nearest-neighbor search behind an injectable strategy.
//!
//! The sampling passes only consume the [`Matcher`] trait, so the default
//! kd-tree backend can be swapped for a grid, octree, or any other spatial
//! index without touching the sampling logic.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Vector3;

/// Sentinel id marking an empty neighbor slot.
pub const INVALID_ID: usize = usize::MAX;

/// Sentinel distance marking an empty neighbor slot.
pub const INVALID_DIST: f64 = f64::INFINITY;

/// Result table of a k-nearest-neighbor query: `knn` entries per query
/// point, ordered by ascending distance, sentinel-filled when fewer
/// neighbors exist.
///
/// Distances are squared Euclidean (the kd-tree's native metric). The
/// sampling passes only compare them against [`INVALID_DIST`], so the
/// metric power is not observable in results.
#[derive(Debug, Clone)]
pub struct Matches {
    knn: usize,
    ids: Vec<usize>,
    dists: Vec<f64>,
}

impl Matches {
    /// An all-sentinel table for `queries` points with `knn` slots each.
    pub fn new(knn: usize, queries: usize) -> Self {
        Self {
            knn,
            ids: vec![INVALID_ID; knn * queries],
            dists: vec![INVALID_DIST; knn * queries],
        }
    }

    /// Neighbor slots per query.
    pub fn knn(&self) -> usize {
        self.knn
    }

    /// Reference index of the `rank`-th neighbor of `query`.
    #[inline]
    pub fn id(&self, rank: usize, query: usize) -> usize {
        self.ids[query * self.knn + rank]
    }

    /// Squared distance to the `rank`-th neighbor of `query`.
    #[inline]
    pub fn dist(&self, rank: usize, query: usize) -> f64 {
        self.dists[query * self.knn + rank]
    }

    /// Fill one neighbor slot.
    pub fn set(&mut self, rank: usize, query: usize, id: usize, dist: f64) {
        self.ids[query * self.knn + rank] = id;
        self.dists[query * self.knn + rank] = dist;
    }
}

/// A nearest-neighbor oracle over a fixed reference point set.
pub trait Matcher {
    /// For each query point, the ordered ids and squared distances of its
    /// nearest reference points, padded with sentinels.
    fn find_closest(&self, queries: &[Vector3<f64>]) -> Matches;
}

/// Builds a [`Matcher`] over a reference set. Injected into the filter so
/// alternative spatial indexes can be substituted.
pub trait MatcherFactory {
    fn build(&self, reference: &[Vector3<f64>], knn: usize) -> Box<dyn Matcher>;
}

/// Default matcher: a kd-tree over the reference points.
pub struct KdTreeMatcher {
    tree: KdTree<f64, 3>,
    knn: usize,
}

impl KdTreeMatcher {
    pub fn new(reference: &[Vector3<f64>], knn: usize) -> Self {
        let mut tree = KdTree::new();
        for (index, point) in reference.iter().enumerate() {
            tree.add(&[point.x, point.y, point.z], index as u64);
        }
        Self { tree, knn }
    }
}

impl Matcher for KdTreeMatcher {
    fn find_closest(&self, queries: &[Vector3<f64>]) -> Matches {
        let mut matches = Matches::new(self.knn, queries.len());
        for (query_index, query) in queries.iter().enumerate() {
            let neighbors = self
                .tree
                .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], self.knn);
            for (rank, neighbor) in neighbors.iter().enumerate() {
                matches.set(rank, query_index, neighbor.item as usize, neighbor.distance);
            }
        }
        matches
    }
}

/// Factory for the default kd-tree matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct KdTreeMatcherFactory;

impl MatcherFactory for KdTreeMatcherFactory {
    fn build(&self, reference: &[Vector3<f64>], knn: usize) -> Box<dyn Matcher> {
        Box::new(KdTreeMatcher::new(reference, knn))
    }
}
