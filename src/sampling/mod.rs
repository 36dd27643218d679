//! Row and column subsampling for tree construction.
//!
//! Rows are sampled once per tree into a caller-provided buffer
//! ([`sample_rows`]); columns are managed incrementally over the life of a
//! tree by [`ColumnSampler`]. Both weighted paths share the [`WeightTree`]
//! accumulator for O(log n) draws without replacement.

mod columns;
mod rows;
mod weight_tree;

pub use columns::ColumnSampler;
pub use rows::{sample_rows, weighted_shuffle, SampleScratch};
pub use weight_tree::WeightTree;
