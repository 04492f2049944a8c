//! Static k-d tree over feature vectors.
//!
//! Built once per matching call by recursive median split, queried for
//! the Euclidean nearest neighbour, then discarded. The index owns a
//! flat copy of the vectors it was built from; `nearest` returns the
//! position of the winning point in that build order.
//!
//! Queries are deterministic: distance ties resolve to the lowest
//! point index, and a query containing NaN components (possible only
//! through pathological cancellation upstream) never improves on the
//! initial candidate, so it deterministically yields point zero.

use crate::feature::FeatureVector;
use smallvec::SmallVec;

#[derive(Debug, Clone)]
struct KdNode {
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// A static nearest-neighbour index over points in `R^d`.
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<FeatureVector>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
    dimension: usize,
}

impl KdTree {
    /// Build the index. Point `i` of the input keeps the identity `i`
    /// in query results.
    #[must_use]
    pub fn build(points: Vec<FeatureVector>) -> Self {
        let dimension = points.first().map_or(0, FeatureVector::dimension);
        let mut nodes = Vec::with_capacity(points.len());
        let root = if dimension == 0 {
            None
        } else {
            let mut order: Vec<usize> = (0..points.len()).collect();
            Self::build_recursive(&points, &mut order, 0, dimension, &mut nodes)
        };
        Self {
            points,
            nodes,
            root,
            dimension,
        }
    }

    fn build_recursive(
        points: &[FeatureVector],
        order: &mut [usize],
        depth: usize,
        dimension: usize,
        nodes: &mut Vec<KdNode>,
    ) -> Option<usize> {
        if order.is_empty() {
            return None;
        }
        let axis = depth % dimension;
        let median = order.len() / 2;
        // Deterministic split: coordinate order, then point index.
        order.select_nth_unstable_by(median, |&a, &b| {
            points[a].as_slice()[axis]
                .total_cmp(&points[b].as_slice()[axis])
                .then_with(|| a.cmp(&b))
        });
        let point = order[median];
        let node_index = nodes.len();
        nodes.push(KdNode {
            point,
            axis,
            left: None,
            right: None,
        });
        let (before, rest) = order.split_at_mut(median);
        let left = Self::build_recursive(points, before, depth + 1, dimension, nodes);
        let right = Self::build_recursive(points, &mut rest[1..], depth + 1, dimension, nodes);
        nodes[node_index].left = left;
        nodes[node_index].right = right;
        Some(node_index)
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check whether the index holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The index of the point nearest to `query` under Euclidean
    /// distance, or `None` when the index is empty.
    #[must_use]
    pub fn nearest(&self, query: &FeatureVector) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }
        debug_assert_eq!(query.dimension(), self.dimension);
        let mut best = (f64::INFINITY, 0usize);
        if let Some(root) = self.root {
            self.search(root, query, &mut best);
        }
        Some(best.1)
    }

    /// Branch-and-bound walk with an explicit stack, so deep splits
    /// stay off the call stack.
    fn search(&self, root: usize, query: &FeatureVector, best: &mut (f64, usize)) {
        let mut pending: SmallVec<[usize; 32]> = SmallVec::new();
        pending.push(root);
        while let Some(index) = pending.pop() {
            let node = &self.nodes[index];
            let point = &self.points[node.point];
            let distance = query.squared_distance(point);
            if distance < best.0 || (distance == best.0 && node.point < best.1) {
                *best = (distance, node.point);
            }
            let delta = query.as_slice()[node.axis] - point.as_slice()[node.axis];
            let (near, far) = if delta < 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            // The far side can only matter when the splitting plane is
            // within the best distance found so far.
            if delta * delta <= best.0
                && let Some(far_child) = far
            {
                pending.push(far_child);
            }
            if let Some(near_child) = near {
                pending.push(near_child);
            }
        }
    }
}
