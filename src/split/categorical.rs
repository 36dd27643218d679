//! Partitioning against categorical columns.
//!
//! Categorical data is encoded as `i32` codes: non-negative codes index into
//! the rule's per-category route mask, negative codes mean missing. Codes at
//! or past the end of the mask are categories the rule never saw; at
//! prediction time these resolve through [`NewCategoryPolicy`].

use super::{route_of, CategoryRoute, MissingPolicy, NewCategoryPolicy, Partition};

fn split_two_pass<L, M>(subset: &mut [usize], matches_left: L, is_missing: M) -> Partition
where
    L: Fn(usize) -> bool,
    M: Fn(usize) -> bool,
{
    let mut st = 0;
    for pos in 0..subset.len() {
        if matches_left(subset[pos]) {
            subset.swap(st, pos);
            st += 1;
        }
    }
    let st_na = st;

    for pos in st..subset.len() {
        if is_missing(subset[pos]) {
            subset.swap(st, pos);
            st += 1;
        }
    }
    Partition::WithMissing { st_na, end_na: st }
}

fn split_single_pass<L: Fn(usize) -> bool>(subset: &mut [usize], matches_left: L) -> Partition {
    let mut split_ix = 0;
    for pos in 0..subset.len() {
        if matches_left(subset[pos]) {
            subset.swap(split_ix, pos);
            split_ix += 1;
        }
    }
    Partition::Clean { split_ix }
}

/// Partition against a subset-mask rule during training: every observed
/// category has a decided `Left`/`Right` route.
pub fn partition_categorical(
    subset: &mut [usize],
    x: &[i32],
    routes: &[CategoryRoute],
    policy: MissingPolicy,
) -> Partition {
    if policy == MissingPolicy::Fail {
        split_single_pass(subset, |row| route_of(routes, x[row]) == Some(CategoryRoute::Left))
    } else {
        split_two_pass(
            subset,
            |row| route_of(routes, x[row]) == Some(CategoryRoute::Left),
            |row| x[row] < 0,
        )
    }
}

/// Partition against a subset-mask rule at prediction time, resolving
/// never-seen categories via the new-category policy.
///
/// Under [`NewCategoryPolicy::Weighted`] new categories join the missing
/// block (and so the result always carries one, even with `Fail`); under
/// `Smallest` they go left exactly when `new_to_left` says the left branch
/// was the smaller one; otherwise they go right.
pub fn partition_categorical_predict(
    subset: &mut [usize],
    x: &[i32],
    routes: &[CategoryRoute],
    policy: MissingPolicy,
    new_policy: NewCategoryPolicy,
    new_to_left: bool,
) -> Partition {
    let new_left = new_policy == NewCategoryPolicy::Smallest && new_to_left;

    if policy == MissingPolicy::Fail && new_policy != NewCategoryPolicy::Weighted {
        return split_single_pass(subset, |row| match route_of(routes, x[row]) {
            Some(CategoryRoute::Left) => true,
            Some(CategoryRoute::New) => new_left,
            _ => false,
        });
    }

    if new_policy == NewCategoryPolicy::Weighted {
        split_two_pass(
            subset,
            |row| route_of(routes, x[row]) == Some(CategoryRoute::Left),
            |row| matches!(route_of(routes, x[row]), None | Some(CategoryRoute::New)),
        )
    } else {
        split_two_pass(
            subset,
            |row| match route_of(routes, x[row]) {
                Some(CategoryRoute::Left) => true,
                Some(CategoryRoute::New) => new_left,
                _ => false,
            },
            |row| x[row] < 0,
        )
    }
}

/// Partition against a single-category equality rule, the matching category
/// to the left.
pub fn partition_single_category(
    subset: &mut [usize],
    x: &[i32],
    category: i32,
    policy: MissingPolicy,
) -> Partition {
    if policy == MissingPolicy::Fail {
        split_single_pass(subset, |row| x[row] == category)
    } else {
        split_two_pass(subset, |row| x[row] == category, |row| x[row] < 0)
    }
}

/// Partition a column recoded to two training categories: 0 goes left,
/// 1 goes right, codes above 1 are new, negative codes are missing.
pub fn partition_two_categories(
    subset: &mut [usize],
    x: &[i32],
    policy: MissingPolicy,
    new_policy: NewCategoryPolicy,
    new_to_left: bool,
) -> Partition {
    let new_left = new_policy == NewCategoryPolicy::Smallest && new_to_left;
    let matches_left = |row: usize| x[row] == 0 || (new_left && x[row] > 1);

    if policy == MissingPolicy::Fail {
        split_single_pass(subset, matches_left)
    } else {
        split_two_pass(subset, matches_left, |row| x[row] < 0)
    }
}
