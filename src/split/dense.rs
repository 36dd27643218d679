//! Partitioning against dense numeric columns and precomputed projections.

use super::{MissingPolicy, Partition};

/// Partition `subset` against a per-position projection buffer.
///
/// `values[pos]` is the projection of the row at `subset[pos]` (hyperplane
/// splits precompute one value per row before partitioning, so lookups are
/// positional rather than by row id). Rows with `values[pos] <= threshold`
/// move to the front; returns the boundary. Missing values must already be
/// folded into the projections.
pub fn partition_projection(subset: &mut [usize], values: &[f64], threshold: f64) -> usize {
    debug_assert_eq!(subset.len(), values.len());
    let mut split_ix = 0;
    for pos in 0..subset.len() {
        if values[pos] <= threshold {
            subset.swap(split_ix, pos);
            split_ix += 1;
        }
    }
    split_ix
}

/// Partition `subset` against a dense numeric column, `x[row] <= threshold`
/// to the left.
///
/// With [`MissingPolicy::Fail`] a single swap pass suffices (NaN compares
/// false and lands right, but the policy asserts there are none). Otherwise a
/// second pass gathers NaN rows into the middle block.
pub fn partition_numeric(
    subset: &mut [usize],
    x: &[f64],
    threshold: f64,
    policy: MissingPolicy,
) -> Partition {
    if policy == MissingPolicy::Fail {
        let mut split_ix = 0;
        for pos in 0..subset.len() {
            if x[subset[pos]] <= threshold {
                subset.swap(split_ix, pos);
                split_ix += 1;
            }
        }
        return Partition::Clean { split_ix };
    }

    let mut st = 0;
    for pos in 0..subset.len() {
        let v = x[subset[pos]];
        if !v.is_nan() && v <= threshold {
            subset.swap(st, pos);
            st += 1;
        }
    }
    let st_na = st;

    for pos in st..subset.len() {
        if x[subset[pos]].is_nan() {
            subset.swap(st, pos);
            st += 1;
        }
    }
    Partition::WithMissing { st_na, end_na: st }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_permutation(subset: &[usize], original: &[usize]) {
        let mut a = subset.to_vec();
        let mut b = original.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b, "partition lost or duplicated indices");
    }

    #[test]
    fn fail_policy_partitions_by_threshold() {
        let x = [5.0, 1.0, 3.0, 2.0, 4.0, 0.0];
        let mut subset: Vec<usize> = (0..6).collect();
        let original = subset.clone();

        let part = partition_numeric(&mut subset, &x, 2.5, MissingPolicy::Fail);
        let Partition::Clean { split_ix } = part else {
            panic!("expected clean partition, got {part:?}");
        };
        assert_eq!(split_ix, 3);
        assert_permutation(&subset, &original);
        for &row in &subset[..split_ix] {
            assert!(x[row] <= 2.5);
        }
        for &row in &subset[split_ix..] {
            assert!(x[row] > 2.5);
        }
    }

    #[test]
    fn missing_block_lands_between_left_and_right() {
        let x = [1.0, f64::NAN, 4.0, 2.0, f64::NAN, 3.0];
        let mut subset: Vec<usize> = (0..6).collect();
        let original = subset.clone();

        let part = partition_numeric(&mut subset, &x, 2.0, MissingPolicy::Divide);
        let Partition::WithMissing { st_na, end_na } = part else {
            panic!("expected missing block, got {part:?}");
        };
        assert_eq!((st_na, end_na), (2, 4));
        assert_permutation(&subset, &original);
        for &row in &subset[..st_na] {
            assert!(x[row] <= 2.0);
        }
        for &row in &subset[st_na..end_na] {
            assert!(x[row].is_nan());
        }
        for &row in &subset[end_na..] {
            assert!(x[row] > 2.0);
        }
    }

    #[test]
    fn all_left_and_all_right_edge_cases() {
        let x = [1.0, 2.0, 3.0];
        let mut subset = vec![0, 1, 2];
        assert_eq!(
            partition_numeric(&mut subset, &x, 10.0, MissingPolicy::Fail),
            Partition::Clean { split_ix: 3 }
        );
        assert_eq!(
            partition_numeric(&mut subset, &x, 0.0, MissingPolicy::Fail),
            Partition::Clean { split_ix: 0 }
        );
    }

    #[test]
    fn projection_partition_is_positional() {
        // Row ids deliberately do not line up with the projection order.
        let mut subset = vec![10, 20, 30, 40];
        let projections = [0.5, -1.0, 2.0, -0.5];
        let split_ix = partition_projection(&mut subset, &projections, 0.0);
        assert_eq!(split_ix, 2);
        let mut left = subset[..split_ix].to_vec();
        left.sort_unstable();
        assert_eq!(left, vec![20, 40]);
    }
}
