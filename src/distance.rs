//! Combinatorial pair counters for distance approximation.
//!
//! Each separating tree node contributes to a packed triangular counter over
//! unordered row pairs. The per-event increment is 1, or the
//! expected-remaining-depth weight when a node stopped short of fully
//! separating its rows and that expectation exceeds 1.
//!
//! During parallel distance approximation each tree accumulates into its own
//! scratch counter, merged into the shared one only once the tree finishes
//! (see [`merge_into`]). The merge order across trees is unspecified, so the
//! final sums can differ across runs in the last floating-point bits.

use std::collections::HashMap;

use ndarray::Array2;

/// Number of unordered pairs over `n` rows, the packed counter length.
#[inline]
pub fn n_pairs(n: usize) -> usize {
    (n * (n - 1)) / 2
}

/// Position of the unordered pair `(i, j)`, `i < j`, in a packed triangular
/// array over `n` rows: row blocks of shrinking length laid out from `i = 0`
/// upward.
#[inline]
pub fn pair_index(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i < j && j < n);
    n_pairs(n) + (j - i) - 1 - ((n - i) * (n - i - 1)) / 2
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Raise the counter of every unordered pair within `subset` by
/// `max(exp_remainder, 1)`.
pub fn accumulate_pairs(counter: &mut [f64], subset: &[usize], n: usize, exp_remainder: f64) {
    let incr = exp_remainder.max(1.0);
    for (el1, &a) in subset.iter().enumerate() {
        for &b in &subset[el1 + 1..] {
            let (i, j) = ordered(a, b);
            counter[pair_index(i, j, n)] += incr;
        }
    }
}

/// Like [`accumulate_pairs`] but scaling each pair by the product of its
/// per-row weights.
pub fn accumulate_pairs_weighted(
    counter: &mut [f64],
    subset: &[usize],
    n: usize,
    row_weights: &[f64],
    exp_remainder: f64,
) {
    let incr = exp_remainder.max(1.0);
    for (el1, &a) in subset.iter().enumerate() {
        for &b in &subset[el1 + 1..] {
            let (i, j) = ordered(a, b);
            counter[pair_index(i, j, n)] += row_weights[i] * row_weights[j] * incr;
        }
    }
}

/// [`accumulate_pairs_weighted`] with weights held in a hash map; rows
/// absent from the map weigh 0.
pub fn accumulate_pairs_map_weighted(
    counter: &mut [f64],
    subset: &[usize],
    n: usize,
    row_weights: &HashMap<usize, f64>,
    exp_remainder: f64,
) {
    let incr = exp_remainder.max(1.0);
    let w = |row: usize| row_weights.get(&row).copied().unwrap_or(0.0);
    for (el1, &a) in subset.iter().enumerate() {
        for &b in &subset[el1 + 1..] {
            let (i, j) = ordered(a, b);
            counter[pair_index(i, j, n)] += w(i) * w(j) * incr;
        }
    }
}

/// Cross-group accumulation for a rectangular counter between the row block
/// `[0, split_ix)` and the block `[split_ix, n)` of the global row set.
///
/// `subset` holds rows from both blocks with the first-block rows forming a
/// contiguous prefix (their count is inferred by scanning until the first id
/// at or past `split_ix`). The counter is indexed `id1 * (n - split_ix) +
/// (id2 - split_ix)`, avoiding a quadratic pass when one block's membership
/// is implicit from contiguity.
pub fn accumulate_cross_groups(
    counter: &mut [f64],
    subset: &[usize],
    split_ix: usize,
    n: usize,
    exp_remainder: f64,
) {
    let n_group = subset.iter().take_while(|&&id| id < split_ix).count();
    let width = n - split_ix;
    let incr = exp_remainder.max(1.0);
    for &id1 in &subset[..n_group] {
        for &id2 in &subset[n_group..] {
            counter[id1 * width + (id2 - split_ix)] += incr;
        }
    }
}

/// Weighted variant of [`accumulate_cross_groups`].
pub fn accumulate_cross_groups_weighted(
    counter: &mut [f64],
    subset: &[usize],
    split_ix: usize,
    n: usize,
    row_weights: &[f64],
    exp_remainder: f64,
) {
    let n_group = subset.iter().take_while(|&&id| id < split_ix).count();
    let width = n - split_ix;
    let incr = exp_remainder.max(1.0);
    for &id1 in &subset[..n_group] {
        for &id2 in &subset[n_group..] {
            counter[id1 * width + (id2 - split_ix)] +=
                row_weights[id1] * row_weights[id2] * incr;
        }
    }
}

/// Expand a packed triangular counter into a dense symmetric matrix with the
/// diagonal set to `diag` (0 for distances, 1 for similarities).
pub fn triangular_to_dense(tmat: &[f64], n: usize, diag: f64) -> Array2<f64> {
    debug_assert_eq!(tmat.len(), n_pairs(n));
    let mut dmat = Array2::<f64>::zeros((n, n));
    for i in 0..n.saturating_sub(1) {
        for j in i + 1..n {
            let v = tmat[pair_index(i, j, n)];
            dmat[(i, j)] = v;
            dmat[(j, i)] = v;
        }
    }
    for i in 0..n {
        dmat[(i, i)] = diag;
    }
    dmat
}

/// Sum a per-tree scratch counter into the shared one.
pub fn merge_into(shared: &mut [f64], scratch: &[f64]) {
    debug_assert_eq!(shared.len(), scratch.len());
    for (acc, &v) in shared.iter_mut().zip(scratch) {
        *acc += v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pair_index_is_a_bijection() {
        let n = 9;
        let mut seen = vec![false; n_pairs(n)];
        for i in 0..n - 1 {
            for j in i + 1..n {
                let ix = pair_index(i, j, n);
                assert!(!seen[ix], "pair ({i},{j}) collides at {ix}");
                seen[ix] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn pair_index_first_and_last() {
        let n = 5;
        assert_eq!(pair_index(0, 1, n), 0);
        assert_eq!(pair_index(n - 2, n - 1, n), n_pairs(n) - 1);
    }

    #[test]
    fn accumulate_counts_every_pair_once() {
        let n = 6;
        let mut counter = vec![0.0; n_pairs(n)];
        accumulate_pairs(&mut counter, &[1, 3, 5], n, 0.0);

        assert_abs_diff_eq!(counter[pair_index(1, 3, n)], 1.0);
        assert_abs_diff_eq!(counter[pair_index(1, 5, n)], 1.0);
        assert_abs_diff_eq!(counter[pair_index(3, 5, n)], 1.0);
        let total: f64 = counter.iter().sum();
        assert_abs_diff_eq!(total, 3.0);
    }

    #[test]
    fn remainder_above_one_scales_the_increment() {
        let n = 4;
        let mut counter = vec![0.0; n_pairs(n)];
        accumulate_pairs(&mut counter, &[0, 2], n, 2.5);
        assert_abs_diff_eq!(counter[pair_index(0, 2, n)], 2.5);
    }

    #[test]
    fn weighted_pairs_multiply_row_weights() {
        let n = 4;
        let weights = [2.0, 1.0, 3.0, 1.0];
        let mut counter = vec![0.0; n_pairs(n)];
        accumulate_pairs_weighted(&mut counter, &[0, 2], n, &weights, 0.0);
        assert_abs_diff_eq!(counter[pair_index(0, 2, n)], 6.0);

        let map: HashMap<usize, f64> = [(0, 2.0), (2, 3.0)].into_iter().collect();
        let mut counter = vec![0.0; n_pairs(n)];
        accumulate_pairs_map_weighted(&mut counter, &[0, 2, 3], n, &map, 0.0);
        assert_abs_diff_eq!(counter[pair_index(0, 2, n)], 6.0);
        // Row 3 is absent from the map and contributes nothing.
        assert_abs_diff_eq!(counter[pair_index(0, 3, n)], 0.0);
    }

    #[test]
    fn cross_groups_touch_only_cross_pairs() {
        // First block is rows [0, 2), second block rows [2, 5).
        let n = 5;
        let split_ix = 2;
        let width = n - split_ix;
        let mut counter = vec![0.0; split_ix * width];
        accumulate_cross_groups(&mut counter, &[0, 1, 2, 4], split_ix, n, 0.0);

        assert_abs_diff_eq!(counter[0 * width + 0], 1.0); // (0, 2)
        assert_abs_diff_eq!(counter[0 * width + 2], 1.0); // (0, 4)
        assert_abs_diff_eq!(counter[1 * width + 0], 1.0); // (1, 2)
        assert_abs_diff_eq!(counter[1 * width + 2], 1.0); // (1, 4)
        let total: f64 = counter.iter().sum();
        assert_abs_diff_eq!(total, 4.0);
    }

    #[test]
    fn dense_expansion_is_symmetric_with_chosen_diagonal() {
        let n = 4;
        let tmat: Vec<f64> = (0..n_pairs(n)).map(|i| i as f64 + 1.0).collect();
        for diag in [0.0, 1.0] {
            let dmat = triangular_to_dense(&tmat, n, diag);
            for i in 0..n {
                assert_abs_diff_eq!(dmat[(i, i)], diag);
                for j in 0..n {
                    assert_abs_diff_eq!(dmat[(i, j)], dmat[(j, i)]);
                }
            }
            assert_abs_diff_eq!(dmat[(0, 1)], tmat[pair_index(0, 1, n)]);
        }
    }

    #[test]
    fn scratch_merging_sums_elementwise() {
        let mut shared = vec![1.0, 2.0, 3.0];
        merge_into(&mut shared, &[0.5, 0.0, 1.5]);
        assert_eq!(shared, vec![1.5, 2.0, 4.5]);
    }
}
