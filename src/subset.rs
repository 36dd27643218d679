//! Row-index subset conventions and weight summation.
//!
//! A row-index subset is a mutable slice of row ids owned by one tree node,
//! always a permutation of the rows handed to the tree. Partitioning
//! reorders it in place; nothing in this crate copies row data. Callers
//! slice their per-tree index buffer to a node's range and pass that slice
//! down, reading back the block boundaries to recurse.

use std::collections::HashMap;

/// Per-row weights as the embedding layer supplies them: none, a dense
/// array indexed by row id, or a sparse map for heavily subsampled runs.
#[derive(Clone, Copy, Debug)]
pub enum RowWeights<'a> {
    Uniform,
    Dense(&'a [f64]),
    Sparse(&'a HashMap<usize, f64>),
}

/// Total weight of a node's subset, used for density-based split gain.
///
/// Returns `f64::NEG_INFINITY` at the root (`depth == 0`) or when rows are
/// unweighted; callers treat the sentinel as "use plain row counts". Rows
/// absent from a sparse map weigh 0.
pub fn sum_weights(subset: &[usize], depth: usize, weights: RowWeights) -> f64 {
    if depth == 0 {
        return f64::NEG_INFINITY;
    }
    match weights {
        RowWeights::Uniform => f64::NEG_INFINITY,
        RowWeights::Dense(w) => subset.iter().map(|&ix| w[ix]).sum(),
        RowWeights::Sparse(w) => subset
            .iter()
            .map(|&ix| w.get(&ix).copied().unwrap_or(0.0))
            .sum(),
    }
}
