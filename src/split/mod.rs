//! In-place partitioning of row-index subsets.
//!
//! Every routine here takes the mutable slice of row indices belonging to one
//! tree node (the caller slices its per-tree index buffer to the node's
//! range), reorders it in place against a decided split rule, and returns the
//! resulting block boundaries as positions relative to the slice start.
//!
//! Layout after partitioning: rows matching the rule form a contiguous
//! prefix, rows failing it a contiguous suffix, and — when the missing-value
//! policy keeps missing rows rather than assuming none exist — missing rows
//! form a middle block `[st_na, end_na)` between the two.
//!
//! Row data is never copied; only index order changes. Out-of-range row ids,
//! mismatched buffer lengths, and similar contract violations are not checked
//! here (see the crate docs).

mod categorical;
mod dense;
mod scan;
mod sparse;

pub use categorical::{
    partition_categorical, partition_categorical_predict, partition_single_category,
    partition_two_categories,
};
pub use dense::{partition_numeric, partition_projection};
pub use scan::{
    center_missing, move_missing_to_front, move_missing_to_front_categorical,
    move_missing_to_front_sparse, scan_categories_present, scan_range_dense, scan_range_sparse,
    CategoryScan, RangeScan,
};
pub use sparse::{materialize_dense, partition_numeric_sparse, SparseColumns};

use serde::{Deserialize, Serialize};

/// How missing values (NaN for numeric data, negative codes for categorical
/// data) are routed during partitioning.
///
/// Under `Fail` the data is assumed to contain no missing values and every
/// partition is a single pass; the other two policies segregate missing rows
/// into their own block so the caller can send them down both branches with
/// reduced weight (`Divide`) or down the branch the rule designates
/// (`Impute`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingPolicy {
    Fail,
    Divide,
    Impute,
}

/// How categories never seen when the split was decided are routed at
/// prediction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewCategoryPolicy {
    /// Treat like a missing value (send down both branches, weighted).
    Weighted,
    /// Send to the branch that received fewer training rows.
    Smallest,
    /// Send to a randomly pre-designated branch.
    Random,
}

/// Per-category routing decision of a subset-mask split rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryRoute {
    Left,
    Right,
    /// Category absent when the rule was decided; resolved at prediction
    /// time via [`NewCategoryPolicy`].
    New,
}

/// Block boundaries produced by a partition, relative to the subset slice.
///
/// `Clean` comes out of [`MissingPolicy::Fail`] partitions: matching rows
/// occupy `[0, split_ix)` and the rest `[split_ix, len)`. The other policies
/// yield `WithMissing`: matching rows in `[0, st_na)`, missing rows in
/// `[st_na, end_na)`, failing rows in `[end_na, len)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    Clean { split_ix: usize },
    WithMissing { st_na: usize, end_na: usize },
}

/// Routing for one categorical value: negative codes are missing, codes past
/// the end of the mask are categories the rule never saw.
#[inline]
pub(crate) fn route_of(routes: &[CategoryRoute], cat: i32) -> Option<CategoryRoute> {
    if cat < 0 {
        return None;
    }
    Some(
        routes
            .get(cat as usize)
            .copied()
            .unwrap_or(CategoryRoute::New),
    )
}
