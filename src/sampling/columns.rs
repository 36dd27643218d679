//! Candidate-column tracking across the construction of one tree.
//!
//! A [`ColumnSampler`] owns the live set of candidate columns for one tree
//! and hands them out one at a time (random draw, exhaustive pass, or
//! randomized exhaustive pass), permanently retiring columns the tree
//! builder finds unsplittable.
//!
//! Two mutually-exclusive modes: an unweighted mode backed by a shuffleable
//! index array with an eligible-prefix boundary, and a weighted mode backed
//! by a [`WeightTree`] plus a dropped-column count. Weighted mode is entered
//! only when valid column weights are supplied, and degrades to unweighted
//! if they turn out degenerate.

use rand::seq::SliceRandom;
use rand::Rng;

use super::weight_tree::WeightTree;

#[derive(Debug, Clone)]
enum Mode {
    Unweighted {
        /// Column ids; the prefix `[0, eligible)` is the live set.
        indices: Vec<usize>,
        eligible: usize,
        /// Cursor for full-pass enumeration over the eligible prefix.
        cursor: usize,
        /// Position (within `indices`) of the last column handed out.
        last_given: usize,
    },
    Weighted {
        tree: WeightTree,
        dropped: usize,
        /// Buffer holding the enumeration order for full passes.
        pass: Vec<usize>,
        pass_len: usize,
        cursor: usize,
    },
}

/// Stateful sampler over the working column set of one tree.
#[derive(Debug, Clone)]
pub struct ColumnSampler {
    n_cols: usize,
    mode: Mode,
}

impl ColumnSampler {
    /// All columns eligible, uniform draws.
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            mode: Mode::Unweighted {
                indices: (0..n_cols).collect(),
                eligible: n_cols,
                cursor: 0,
                last_given: 0,
            },
        }
    }

    /// All columns eligible, draws proportional to `weights`.
    ///
    /// Degenerate weights (NaN or non-positive total) degrade to the
    /// unweighted sampler with a diagnostic, mirroring row sampling.
    pub fn with_weights(weights: &[f64]) -> Self {
        match WeightTree::from_weights(weights) {
            Some(tree) => Self {
                n_cols: weights.len(),
                mode: Mode::Weighted {
                    tree,
                    dropped: 0,
                    pass: Vec::new(),
                    pass_len: 0,
                    cursor: 0,
                },
            },
            None => {
                log::warn!("numeric precision error with column weights, will not use them");
                Self::new(weights.len())
            }
        }
    }

    /// Whether the sampler is in weighted mode.
    pub fn has_weights(&self) -> bool {
        matches!(self.mode, Mode::Weighted { .. })
    }

    /// Discard the weights and reset to unweighted mode with every column
    /// eligible again.
    pub fn drop_weights(&mut self) {
        *self = Self::new(self.n_cols);
    }

    /// Columns still eligible for drawing.
    pub fn remaining_count(&self) -> usize {
        match &self.mode {
            Mode::Unweighted { eligible, .. } => *eligible,
            Mode::Weighted { dropped, .. } => self.n_cols - dropped,
        }
    }

    /// Narrow the eligible set to a random `m`-subset. Restricting to 0 or
    /// to the full set is a no-op.
    ///
    /// Unweighted mode reuses the row-sampling swap strategies (front
    /// partial shuffle for small fractions, back partial shuffle for large
    /// ones, full shuffle between). Weighted mode performs `m` weighted
    /// draws without replacement into a fresh tree and rebuilds it.
    pub fn restrict_to<R: Rng>(&mut self, m: usize, rng: &mut R) {
        if m == 0 || m >= self.n_cols {
            return;
        }
        let n_cols = self.n_cols;
        let mut exhausted = false;

        match &mut self.mode {
            Mode::Unweighted { indices, eligible, .. } => {
                if m <= n_cols / 4 {
                    // Small subset: move m random picks to the front.
                    for pos in 0..m {
                        let chosen = rng.gen_range(0..n_cols - pos);
                        indices.swap(pos + chosen, pos);
                    }
                } else if m as f64 >= 0.75 * n_cols as f64 {
                    // Large subset: move the n-m excluded picks to the back.
                    for i in (m..n_cols).rev() {
                        let chosen = rng.gen_range(0..=i);
                        indices.swap(chosen, i);
                    }
                } else {
                    indices.shuffle(rng);
                }
                *eligible = m;
            }

            Mode::Weighted { tree, dropped, .. } => {
                let mut kept = m;
                let mut pool = tree.clone();
                tree.clear();
                for col in 0..m {
                    let item = match pool.draw(rng) {
                        Some(item) => item,
                        None => {
                            kept = col;
                            break;
                        }
                    };
                    let w = pool.leaf_weight(item);
                    pool.zero_leaf(item);
                    tree.set_leaf(item, w);
                }
                if kept == 0 {
                    // No weight left at all: nothing to restrict over.
                    exhausted = true;
                } else {
                    tree.rebuild_internal();
                    *dropped = n_cols - kept;
                }
            }
        }

        if exhausted {
            self.drop_weights();
        }
    }

    /// Permanently retire `col` from future draws within this tree.
    ///
    /// In unweighted mode `col` must be the column most recently returned
    /// by [`draw_one`](Self::draw_one) or [`next_in_pass`](Self::next_in_pass)
    /// (the retirement is an O(1) prefix swap at its known position).
    pub fn drop_col(&mut self, col: usize) {
        match &mut self.mode {
            Mode::Unweighted { indices, eligible, cursor, last_given } => {
                debug_assert_eq!(indices[*last_given], col, "can only drop the last drawn column");
                *eligible -= 1;
                indices.swap(*last_given, *eligible);
                if *cursor > 0 {
                    *cursor -= 1;
                }
            }
            Mode::Weighted { tree, dropped, .. } => {
                *dropped += 1;
                tree.zero_leaf(col);
            }
        }
    }

    /// Draw one eligible column without removing it, or `None` when no
    /// eligible column remains.
    pub fn draw_one<R: Rng>(&mut self, rng: &mut R) -> Option<usize> {
        match &mut self.mode {
            Mode::Unweighted { indices, eligible, last_given, .. } => match *eligible {
                0 => None,
                1 => {
                    *last_given = 0;
                    Some(indices[0])
                }
                n => {
                    *last_given = rng.gen_range(0..n);
                    Some(indices[*last_given])
                }
            },
            Mode::Weighted { tree, .. } => tree.draw(rng),
        }
    }

    /// Prepare an exhaustive enumeration of the eligible columns.
    pub fn begin_full_pass(&mut self) {
        match &mut self.mode {
            Mode::Unweighted { cursor, .. } => *cursor = 0,
            Mode::Weighted { tree, pass, pass_len, cursor, .. } => {
                *cursor = 0;
                pass.clear();
                pass.extend((0..tree.len()).filter(|&c| tree.leaf_weight(c) > 0.));
                *pass_len = pass.len();
            }
        }
    }

    /// Next column of the current pass, each eligible column exactly once.
    pub fn next_in_pass(&mut self) -> Option<usize> {
        match &mut self.mode {
            Mode::Unweighted { indices, eligible, cursor, last_given } => {
                if *cursor >= *eligible {
                    return None;
                }
                *last_given = *cursor;
                let col = indices[*cursor];
                *cursor += 1;
                Some(col)
            }
            Mode::Weighted { pass, pass_len, cursor, .. } => {
                if *cursor >= *pass_len {
                    return None;
                }
                let col = pass[*cursor];
                *cursor += 1;
                Some(col)
            }
        }
    }

    /// Randomize the order of the next full pass. Weighted mode derives the
    /// order by repeated weighted draws over a private copy of the tree, so
    /// the live accumulator is unaffected.
    pub fn shuffle_remaining<R: Rng>(&mut self, rng: &mut R) {
        match &mut self.mode {
            Mode::Unweighted { indices, eligible, cursor, .. } => {
                *cursor = 0;
                indices[..*eligible].shuffle(rng);
            }
            Mode::Weighted { tree, pass, pass_len, cursor, .. } => {
                if tree.total() <= 0. {
                    return;
                }
                *cursor = 0;
                pass.clear();
                let mut pool = tree.clone();
                while let Some(item) = pool.draw_and_remove(rng) {
                    pass.push(item);
                }
                *pass_len = pass.len();
            }
        }
    }

    /// Total columns the sampler was initialized over.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }
}
