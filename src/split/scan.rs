//! Read-only scans over a row subset: column splittability, value ranges,
//! and missing-row segregation used ahead of distance/imputation passes.

use super::sparse::SparseColumns;

/// Observed value range of a column over one subset.
///
/// `unsplittable` is set when the column cannot produce a meaningful split
/// there: constant, all-missing, or empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeScan {
    pub min: f64,
    pub max: f64,
    pub unsplittable: bool,
}

impl RangeScan {
    fn finish(min: f64, max: f64) -> Self {
        let unsplittable = min == max
            || (min == f64::INFINITY && max == f64::NEG_INFINITY)
            || min.is_nan()
            || max.is_nan();
        Self { min, max, unsplittable }
    }
}

/// Min/max of a dense numeric column over `subset`; NaN entries are skipped.
pub fn scan_range_dense(subset: &[usize], x: &[f64]) -> RangeScan {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &row in subset {
        min = min.min(x[row]);
        max = max.max(x[row]);
    }
    RangeScan::finish(min, max)
}

/// Min/max of a sparse column over a sorted `subset`.
///
/// Implicit zeros count toward the range whenever some subset row lacks an
/// explicit entry. A column whose explicit entries do not overlap the subset
/// at all is reported unsplittable outright (it reads as all-zero there).
pub fn scan_range_sparse(subset: &[usize], col: usize, cols: &SparseColumns) -> RangeScan {
    let (vals, rows) = cols.column(col);

    if subset.is_empty()
        || rows.is_empty()
        || rows[0] > subset[subset.len() - 1]
        || subset[0] > rows[rows.len() - 1]
    {
        return RangeScan { min: f64::INFINITY, max: f64::NEG_INFINITY, unsplittable: true };
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut nmatches = 0usize;
    let mut cur = 0usize;
    for &row in subset {
        cur += rows[cur..].partition_point(|&r| r < row);
        match rows.get(cur) {
            Some(&r) if r == row => {
                nmatches += 1;
                min = min.min(vals[cur]);
                max = max.max(vals[cur]);
            }
            _ => {}
        }
    }

    if nmatches < subset.len() {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    RangeScan::finish(min, max)
}

/// Category presence over one subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryScan {
    pub npresent: usize,
    /// Fewer than two categories observed.
    pub unsplittable: bool,
}

/// Mark which categories occur in `subset` (negative codes skipped) and
/// count them. `present` must hold one flag per category and is overwritten.
pub fn scan_categories_present(subset: &[usize], x: &[i32], present: &mut [bool]) -> CategoryScan {
    present.fill(false);
    for &row in subset {
        if x[row] >= 0 {
            present[x[row] as usize] = true;
        }
    }
    let npresent = present.iter().filter(|&&p| p).count();
    CategoryScan { npresent, unsplittable: npresent < 2 }
}

/// Swap rows whose dense value is NaN or infinite to the front of `subset`;
/// returns the count of such rows.
pub fn move_missing_to_front(subset: &mut [usize], x: &[f64]) -> usize {
    let mut st = 0;
    for pos in 0..subset.len() {
        if !x[subset[pos]].is_finite() {
            subset.swap(st, pos);
            st += 1;
        }
    }
    st
}

/// Sparse-column variant of [`move_missing_to_front`]. Sorts `subset` before
/// walking it, so the caller's order is not preserved.
pub fn move_missing_to_front_sparse(
    subset: &mut [usize],
    col: usize,
    cols: &SparseColumns,
) -> usize {
    subset.sort_unstable();
    let (vals, rows) = cols.column(col);
    let mut st = 0;
    let mut cur = 0usize;
    for pos in 0..subset.len() {
        let row = subset[pos];
        cur += rows[cur..].partition_point(|&r| r < row);
        if let Some(&r) = rows.get(cur) {
            if r == row && !vals[cur].is_finite() {
                subset.swap(st, pos);
                st += 1;
            }
        }
    }
    st
}

/// Categorical variant of [`move_missing_to_front`]: negative codes are
/// missing.
pub fn move_missing_to_front_categorical(subset: &mut [usize], x: &[i32]) -> usize {
    let mut st = 0;
    for pos in 0..subset.len() {
        if x[subset[pos]] < 0 {
            subset.swap(st, pos);
            st += 1;
        }
    }
    st
}

/// Move a block of missing rows `[st_left, st)` so it ends at `curr_pos`,
/// swapping backwards; returns the new block start. Used to rebuild the
/// left/missing/right layout after a recursive call repositioned the left
/// block.
pub fn center_missing(ix: &mut [usize], st_left: usize, st: usize, mut curr_pos: usize) -> usize {
    for row in st_left..st {
        curr_pos -= 1;
        ix.swap(curr_pos, row);
    }
    curr_pos
}
