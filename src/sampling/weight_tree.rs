//! Implicit binary-tree accumulator for weighted sampling.
//!
//! A flat array holds a perfectly-balanced binary tree: leaves
//! `[offset, offset + n)` carry per-item weights and every internal node the
//! sum of its two children, so a weighted draw is a single root-to-leaf
//! descent against a uniform variate and removing a drawn item is a leaf
//! zeroing plus one ancestor-resum walk. Both are O(log n).
//!
//! The tree is private to the construction of one isolation tree and is
//! never shared across worker threads, so it carries no synchronization.

use rand::Rng;

/// Number of tree levels needed for `n` leaves (ceil(log2(n))).
#[inline]
pub(crate) fn tree_levels(n: usize) -> u32 {
    debug_assert!(n > 0);
    n.next_power_of_two().trailing_zeros()
}

/// Weighted binary-tree accumulator over `n` items.
///
/// Invariant: every internal node equals the sum of its two children; the
/// root holds the total remaining weight.
#[derive(Debug, Clone)]
pub struct WeightTree {
    nodes: Vec<f64>,
    levels: u32,
    offset: usize,
    n_items: usize,
}

impl WeightTree {
    /// Build an accumulator from per-item weights, clamping negatives to 0.
    ///
    /// Returns `None` when the weights are degenerate (total is NaN or
    /// non-positive); callers are expected to degrade to unweighted
    /// sampling and report the fallback.
    pub fn from_weights(weights: &[f64]) -> Option<Self> {
        if weights.is_empty() {
            return None;
        }
        let levels = tree_levels(weights.len());
        let offset = (1usize << levels) - 1;
        let mut nodes = vec![0.0; (1usize << (levels + 1)) - 1 + 1];

        for (i, &w) in weights.iter().enumerate() {
            nodes[offset + i] = w.max(0.);
        }
        for ix in (1..nodes.len()).rev() {
            nodes[(ix - 1) / 2] += nodes[ix];
        }

        if nodes[0].is_nan() || nodes[0] <= 0. {
            return None;
        }

        Some(Self {
            nodes,
            levels,
            offset,
            n_items: weights.len(),
        })
    }

    /// Number of items (leaves) the tree was built over.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_items
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_items == 0
    }

    /// Total remaining weight (the root).
    #[inline]
    pub fn total(&self) -> f64 {
        self.nodes[0]
    }

    /// Current weight of one leaf.
    #[inline]
    pub fn leaf_weight(&self, item: usize) -> f64 {
        self.nodes[self.offset + item]
    }

    /// Root-to-leaf descent: at each level draw uniformly over the node's
    /// accumulated weight and branch right when the draw falls past the
    /// left child's share. Caller must ensure `total() > 0`.
    fn descend<R: Rng>(&self, rng: &mut R) -> usize {
        let mut ix = 0usize;
        let mut subrange = self.nodes[0];
        for _ in 0..self.levels {
            let r = rng.gen::<f64>() * subrange;
            let left = 2 * ix + 1;
            let w_left = self.nodes[left];
            ix = left + usize::from(r >= w_left);
            subrange = self.nodes[ix];
        }
        ix - self.offset
    }

    /// Draw one item proportionally to its weight without removing it.
    ///
    /// Returns `None` once no weight remains.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.nodes[0] <= 0. {
            return None;
        }
        Some(self.descend(rng))
    }

    /// Draw one item and remove its weight so it cannot be drawn again.
    pub fn draw_and_remove<R: Rng>(&mut self, rng: &mut R) -> Option<usize> {
        let item = self.draw(rng)?;
        self.zero_leaf(item);
        Some(item)
    }

    /// Zero one leaf and resum its ancestors up to the root.
    pub fn zero_leaf(&mut self, item: usize) {
        let mut ix = self.offset + item;
        self.nodes[ix] = 0.;
        while ix > 0 {
            ix = (ix - 1) / 2;
            let left = 2 * ix + 1;
            self.nodes[ix] = self.nodes[left] + self.nodes[left + 1];
        }
    }

    /// Overwrite one leaf without updating ancestors. Must be followed by
    /// [`rebuild_internal`](Self::rebuild_internal) before any draw.
    pub fn set_leaf(&mut self, item: usize, weight: f64) {
        self.nodes[self.offset + item] = weight;
    }

    /// Zero every node (leaves included).
    pub fn clear(&mut self) {
        self.nodes.fill(0.);
    }

    /// Recompute all internal sums from the current leaves.
    pub fn rebuild_internal(&mut self) {
        for ix in 0..self.offset {
            self.nodes[ix] = 0.;
        }
        for ix in (1..self.nodes.len()).rev() {
            self.nodes[(ix - 1) / 2] += self.nodes[ix];
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariant(&self) {
        for ix in 0..self.offset {
            let left = 2 * ix + 1;
            let sum = self.nodes[left] + self.nodes[left + 1];
            assert!(
                (self.nodes[ix] - sum).abs() <= 1e-9 * (1.0 + sum.abs()),
                "internal node {ix} = {} but children sum to {sum}",
                self.nodes[ix]
            );
        }
    }
}
