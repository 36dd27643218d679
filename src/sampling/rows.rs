//! Row sampling for tree construction.
//!
//! Draws the row subset one tree is grown on. The strategy depends on the
//! replacement flag, the presence of weights, and the sampled fraction:
//!
//! - with replacement: independent draws (uniform, or a discrete
//!   distribution over the weights);
//! - without replacement, `k == n`: identity, no randomness;
//! - without replacement, weighted: repeated O(log n) draws from a
//!   [`WeightTree`], zeroing each drawn leaf;
//! - without replacement, unweighted: full shuffle for `k >= 3n/4`, partial
//!   Fisher-Yates for `k >= n/2`, Floyd's algorithm below that, tracking
//!   collisions in a dense boolean array when `k/n > 1/20` and in a hash
//!   set for very small samples.
//!
//! Degenerate weights (NaN or non-positive total) are a numeric-precision
//! failure: the draw silently degrades to its unweighted equivalent and a
//! `log::warn!` diagnostic is emitted, never an error.

use std::collections::HashSet;

use rand::distributions::WeightedIndex;
use rand::seq::SliceRandom;
use rand::Rng;

use super::weight_tree::WeightTree;

/// Reusable scratch buffers for [`sample_rows`], allocated once per worker
/// and reused across trees.
#[derive(Debug, Default)]
pub struct SampleScratch {
    all: Vec<usize>,
    seen: Vec<bool>,
}

impl SampleScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fill `out` with `out.len()` row indices drawn from `[0, n_rows)`.
///
/// `weights`, when present, must have length `n_rows`; rows with larger
/// weight are proportionally more likely. Without replacement the result
/// contains no duplicates.
///
/// Out-of-range lengths (`out.len() > n_rows` without replacement) are a
/// caller contract violation and are only checked in debug builds.
pub fn sample_rows<R: Rng>(
    out: &mut [usize],
    n_rows: usize,
    with_replacement: bool,
    weights: Option<&[f64]>,
    scratch: &mut SampleScratch,
    rng: &mut R,
) {
    let ntake = out.len();
    debug_assert!(with_replacement || ntake <= n_rows);

    if with_replacement {
        match weights.and_then(|w| WeightedIndex::new(w.iter().map(|&x| x.max(0.))).ok()) {
            Some(dist) => {
                for ix in out.iter_mut() {
                    *ix = rng.sample(&dist);
                }
            }
            None => {
                if weights.is_some() {
                    log::warn!("numeric precision error with sample weights, will not use them");
                }
                for ix in out.iter_mut() {
                    *ix = rng.gen_range(0..n_rows);
                }
            }
        }
        return;
    }

    // Everything requested: identity permutation, no randomness spent.
    if ntake == n_rows {
        for (i, ix) in out.iter_mut().enumerate() {
            *ix = i;
        }
        return;
    }

    if let Some(w) = weights {
        match WeightTree::from_weights(w) {
            Some(mut tree) => {
                for ix in out.iter_mut() {
                    // The tree cannot run dry before `ntake <= n_rows` draws
                    // unless fewer rows than that carry positive weight; keep
                    // drawing uniformly over what the tree reports in that case.
                    *ix = tree.draw_and_remove(rng).unwrap_or_else(|| rng.gen_range(0..n_rows));
                }
                return;
            }
            None => {
                log::warn!("numeric precision error with sample weights, will not use them");
            }
        }
    }

    sample_rows_unweighted(out, n_rows, scratch, rng);
}

fn sample_rows_unweighted<R: Rng>(
    out: &mut [usize],
    n_rows: usize,
    scratch: &mut SampleScratch,
    rng: &mut R,
) {
    let ntake = out.len();

    if ntake >= n_rows / 2 {
        scratch.all.clear();
        scratch.all.extend(0..n_rows);

        if ntake >= (n_rows * 3) / 4 {
            // Large fraction: full shuffle, take a prefix.
            scratch.all.shuffle(rng);
            out.copy_from_slice(&scratch.all[..ntake]);
        } else {
            // Partial Fisher-Yates: only `ntake` steps, copying each chosen
            // element out and backfilling from the shrinking tail.
            for (k, i) in (n_rows - ntake..n_rows).rev().enumerate() {
                let chosen = rng.gen_range(0..=i);
                out[k] = scratch.all[chosen];
                scratch.all[chosen] = scratch.all[i];
            }
        }
        return;
    }

    // Floyd's algorithm: iterate candidate pool sizes n-k+1..=n; on collision
    // take the pool boundary itself, which cannot have been taken before.
    if ntake as f64 / n_rows as f64 > 1.0 / 20.0 {
        scratch.seen.clear();
        scratch.seen.resize(n_rows, false);
        for pool in n_rows - ntake..n_rows {
            let candidate = rng.gen_range(0..=pool);
            let slot = ntake - (n_rows - pool);
            if scratch.seen[candidate] {
                out[slot] = pool;
                scratch.seen[pool] = true;
            } else {
                out[slot] = candidate;
                scratch.seen[candidate] = true;
            }
        }
    } else {
        // Very small sample: a hash set bounds memory independently of n.
        let mut seen: HashSet<usize> = HashSet::with_capacity(ntake * 2);
        for pool in n_rows - ntake..n_rows {
            let candidate = rng.gen_range(0..=pool);
            let slot = ntake - (n_rows - pool);
            if seen.insert(candidate) {
                out[slot] = candidate;
            } else {
                out[slot] = pool;
                seen.insert(pool);
            }
        }
    }
}

/// Produce a full ordering of `out.len()` items biased by weight: heavier
/// items tend to appear earlier. Degenerate weights degrade to a plain
/// unweighted shuffle with a diagnostic.
pub fn weighted_shuffle<R: Rng>(out: &mut [usize], weights: &[f64], rng: &mut R) {
    debug_assert_eq!(out.len(), weights.len());

    match WeightTree::from_weights(weights) {
        Some(mut tree) => {
            for pos in 0..out.len() {
                match tree.draw_and_remove(rng) {
                    Some(item) => out[pos] = item,
                    // Remaining weight hit zero (some items had weight 0):
                    // fall back to filling with the not-yet-drawn items.
                    None => {
                        fill_remaining(out, pos, rng);
                        return;
                    }
                }
            }
        }
        None => {
            log::warn!("numeric precision error with sample weights, will not use them");
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = i;
            }
            out.shuffle(rng);
        }
    }
}

/// Backfill of `weighted_shuffle` once the tree runs dry: `out[..filled]`
/// already holds drawn items; append the missing ones in random order.
fn fill_remaining<R: Rng>(out: &mut [usize], filled: usize, rng: &mut R) {
    let mut present = vec![false; out.len()];
    for &ix in &out[..filled] {
        present[ix] = true;
    }
    let mut rest: Vec<usize> = (0..out.len()).filter(|&i| !present[i]).collect();
    rest.shuffle(rng);
    out[filled..].copy_from_slice(&rest);
}
