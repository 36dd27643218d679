//! Partitioning against compressed sparse-column numeric data.
//!
//! Sparse routines never materialize a dense column: the row-index subset,
//! which callers must keep sorted ascending for these entry points, is walked
//! in lockstep with the column's sorted explicit entries through a monotone
//! binary-search cursor. Rows without an explicit entry read as implicit 0.
//!
//! The lockstep walk stays valid during in-place partitioning because swaps
//! only ever write at or behind the scan position, so the unscanned tail of
//! the subset keeps its ascending order.

use super::{MissingPolicy, Partition};

/// Borrowed view over a CSC matrix: column `c` owns the slice
/// `[col_ptr[c], col_ptr[c+1])` of parallel `values`/`row_indices` arrays,
/// with row indices sorted ascending within each column.
#[derive(Clone, Copy, Debug)]
pub struct SparseColumns<'a> {
    values: &'a [f64],
    row_indices: &'a [usize],
    col_ptr: &'a [usize],
}

impl<'a> SparseColumns<'a> {
    pub fn new(values: &'a [f64], row_indices: &'a [usize], col_ptr: &'a [usize]) -> Self {
        debug_assert_eq!(values.len(), row_indices.len());
        debug_assert!(!col_ptr.is_empty());
        debug_assert_eq!(*col_ptr.last().unwrap(), values.len());
        Self { values, row_indices, col_ptr }
    }

    pub fn n_cols(&self) -> usize {
        self.col_ptr.len() - 1
    }

    /// Explicit entries of one column as `(values, row_indices)` slices.
    pub fn column(&self, col: usize) -> (&'a [f64], &'a [usize]) {
        let lo = self.col_ptr[col];
        let hi = self.col_ptr[col + 1];
        (&self.values[lo..hi], &self.row_indices[lo..hi])
    }
}

/// Monotone cursor into one column's explicit entries; `value_of` must be
/// called with non-decreasing row ids.
struct ColumnWalk<'a> {
    vals: &'a [f64],
    rows: &'a [usize],
    cur: usize,
}

impl<'a> ColumnWalk<'a> {
    fn new(vals: &'a [f64], rows: &'a [usize]) -> Self {
        Self { vals, rows, cur: 0 }
    }

    #[inline]
    fn value_of(&mut self, row: usize) -> f64 {
        self.cur += self.rows[self.cur..].partition_point(|&r| r < row);
        match self.rows.get(self.cur) {
            Some(&r) if r == row => self.vals[self.cur],
            _ => 0.0,
        }
    }
}

/// Partition a sorted `subset` against one sparse column,
/// `value <= threshold` to the left, implicit zeros included.
///
/// When the column's explicit entries do not overlap the subset at all, the
/// whole subset reads as implicit zero and a single `0 <= threshold`
/// comparison routes it, under every policy.
pub fn partition_numeric_sparse(
    subset: &mut [usize],
    col: usize,
    cols: &SparseColumns,
    threshold: f64,
    policy: MissingPolicy,
) -> Partition {
    let (vals, rows) = cols.column(col);

    let overlap = !subset.is_empty()
        && !rows.is_empty()
        && rows[rows.len() - 1] >= subset[0]
        && rows[0] <= subset[subset.len() - 1];
    if !overlap {
        let boundary = if 0.0 <= threshold { subset.len() } else { 0 };
        return match policy {
            MissingPolicy::Fail => Partition::Clean { split_ix: boundary },
            _ => Partition::WithMissing { st_na: boundary, end_na: boundary },
        };
    }

    if policy == MissingPolicy::Fail {
        let mut walk = ColumnWalk::new(vals, rows);
        let mut split_ix = 0;
        for pos in 0..subset.len() {
            if walk.value_of(subset[pos]) <= threshold {
                subset.swap(split_ix, pos);
                split_ix += 1;
            }
        }
        return Partition::Clean { split_ix };
    }

    let mut walk = ColumnWalk::new(vals, rows);
    let mut st = 0;
    let mut has_na = false;
    for pos in 0..subset.len() {
        let v = walk.value_of(subset[pos]);
        if v.is_nan() {
            has_na = true;
        } else if v <= threshold {
            subset.swap(st, pos);
            st += 1;
        }
    }
    let st_na = st;

    if has_na {
        // The displaced remainder is no longer sorted; restore order so the
        // lockstep walk can extract the NaN rows.
        subset[st..].sort_unstable();
        let mut walk = ColumnWalk::new(vals, rows);
        for pos in st..subset.len() {
            if walk.value_of(subset[pos]).is_nan() {
                subset.swap(st, pos);
                st += 1;
            }
        }
    }
    Partition::WithMissing { st_na, end_na: st }
}

/// Expand one sparse column's values for a sorted `subset` into a dense
/// scratch buffer, `out[pos]` holding the value of row `subset[pos]`.
pub fn materialize_dense(subset: &[usize], col: usize, cols: &SparseColumns, out: &mut [f64]) {
    debug_assert_eq!(subset.len(), out.len());
    let (vals, rows) = cols.column(col);
    let mut walk = ColumnWalk::new(vals, rows);
    for (pos, &row) in subset.iter().enumerate() {
        out[pos] = walk.value_of(row);
    }
}

#[cfg(test)]
mod tests {
    use super::super::partition_numeric;
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    /// Build a single-column CSC from a dense column, treating 0.0 as implicit.
    fn csc_from_dense(dense: &[f64]) -> (Vec<f64>, Vec<usize>, Vec<usize>) {
        let mut values = Vec::new();
        let mut row_indices = Vec::new();
        for (row, &v) in dense.iter().enumerate() {
            if v != 0.0 || v.is_nan() {
                values.push(v);
                row_indices.push(row);
            }
        }
        let col_ptr = vec![0, values.len()];
        (values, row_indices, col_ptr)
    }

    fn membership(subset: &[usize], part: Partition) -> Vec<(usize, u8)> {
        // (row, block) pairs, block 0=left 1=missing 2=right, sorted by row.
        let (st_na, end_na) = match part {
            Partition::Clean { split_ix } => (split_ix, split_ix),
            Partition::WithMissing { st_na, end_na } => (st_na, end_na),
        };
        let mut m: Vec<(usize, u8)> = subset
            .iter()
            .enumerate()
            .map(|(pos, &row)| {
                let block = if pos < st_na {
                    0
                } else if pos < end_na {
                    1
                } else {
                    2
                };
                (row, block)
            })
            .collect();
        m.sort_unstable();
        m
    }

    #[test]
    fn agrees_with_dense_partitioning_on_random_patterns() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(404);
        for trial in 0..50 {
            let n = 30;
            let density = match trial % 3 {
                0 => 0.0, // all-zero column
                1 => 1.0, // all-explicit column
                _ => 0.4,
            };
            let dense: Vec<f64> = (0..n)
                .map(|_| {
                    if rng.gen::<f64>() < density {
                        let v: f64 = rng.gen_range(-3.0..3.0);
                        if v == 0.0 { 0.5 } else { v }
                    } else {
                        0.0
                    }
                })
                .collect();
            let (values, row_indices, col_ptr) = csc_from_dense(&dense);
            let cols = SparseColumns::new(&values, &row_indices, &col_ptr);
            let threshold: f64 = rng.gen_range(-2.0..2.0);

            for policy in [MissingPolicy::Fail, MissingPolicy::Divide] {
                let mut sparse_subset: Vec<usize> = (0..n).step_by(2).collect();
                let mut dense_subset = sparse_subset.clone();

                let sp = partition_numeric_sparse(&mut sparse_subset, 0, &cols, threshold, policy);
                let dp = partition_numeric(&mut dense_subset, &dense, threshold, policy);

                assert_eq!(
                    membership(&sparse_subset, sp),
                    membership(&dense_subset, dp),
                    "trial {trial}, threshold {threshold}, {policy:?}"
                );
            }
        }
    }

    #[test]
    fn nan_entries_form_the_missing_block() {
        let dense = [0.0, f64::NAN, -1.0, 0.0, 2.0, f64::NAN];
        let (values, row_indices, col_ptr) = csc_from_dense(&dense);
        let cols = SparseColumns::new(&values, &row_indices, &col_ptr);

        let mut subset: Vec<usize> = (0..6).collect();
        let part = partition_numeric_sparse(&mut subset, 0, &cols, 0.0, MissingPolicy::Divide);
        let Partition::WithMissing { st_na, end_na } = part else {
            panic!("expected missing block, got {part:?}");
        };
        // Left: rows 0, 2, 3 (zero or -1). Missing: rows 1, 5. Right: row 4.
        assert_eq!((st_na, end_na), (3, 5));
        let mut left = subset[..st_na].to_vec();
        left.sort_unstable();
        assert_eq!(left, vec![0, 2, 3]);
        let mut missing = subset[st_na..end_na].to_vec();
        missing.sort_unstable();
        assert_eq!(missing, vec![1, 5]);
        assert_eq!(&subset[end_na..], &[4]);
    }

    #[test]
    fn non_overlap_routes_whole_subset_by_zero_comparison() {
        let values = [5.0, 7.0];
        let row_indices = [100, 101];
        let col_ptr = [0, 2];
        let cols = SparseColumns::new(&values, &row_indices, &col_ptr);

        for policy in [MissingPolicy::Fail, MissingPolicy::Divide] {
            let mut subset = vec![0, 1, 2, 3];
            let part = partition_numeric_sparse(&mut subset, 0, &cols, 1.0, policy);
            let split = match part {
                Partition::Clean { split_ix } => split_ix,
                Partition::WithMissing { st_na, end_na } => {
                    assert_eq!(st_na, end_na);
                    st_na
                }
            };
            assert_eq!(split, 4, "zero <= 1.0 should route everything left");

            let mut subset = vec![0, 1, 2, 3];
            let part = partition_numeric_sparse(&mut subset, 0, &cols, -1.0, policy);
            let split = match part {
                Partition::Clean { split_ix } => split_ix,
                Partition::WithMissing { st_na, end_na } => {
                    assert_eq!(st_na, end_na);
                    st_na
                }
            };
            assert_eq!(split, 0, "zero > -1.0 should route everything right");
        }
    }

    #[test]
    fn materialize_matches_dense_column() {
        let dense = [0.0, 1.5, 0.0, -2.0, 0.0, 3.0, f64::NAN];
        let (values, row_indices, col_ptr) = csc_from_dense(&dense);
        let cols = SparseColumns::new(&values, &row_indices, &col_ptr);

        let subset = [1, 2, 3, 6];
        let mut out = [0.0; 4];
        materialize_dense(&subset, 0, &cols, &mut out);
        assert_eq!(out[0], 1.5);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], -2.0);
        assert!(out[3].is_nan());
    }
}
