//! Computational core of an isolation-forest-style anomaly-detection engine.
//!
//! This crate provides the per-node primitives that tree-growing, scoring,
//! distance-approximation, and imputation layers are built on:
//!
//! - [`sampling`] — row subsampling and candidate-column tracking, weighted
//!   through implicit binary-tree accumulators with O(log n) draws;
//! - [`split`] — in-place partitioning of row-index subsets against numeric
//!   (dense or CSC-sparse) and categorical split rules, with explicit
//!   missing-value routing, plus the range/category scanners that decide
//!   splittability;
//! - [`stats`] — expected isolation and separation depths, harmonic numbers
//!   and digamma, numerically stable from n = 1 past 10^8;
//! - [`distance`] — packed triangular pair counters and their dense
//!   symmetric expansion;
//! - [`interrupt`] — cooperative cancellation shared by all workers.
//!
//! Forest assembly, persistence, and fit/predict entry points live in the
//! layers above; this crate only ever sees borrowed data slices and
//! caller-owned index buffers.
//!
//! # Contract violations are not checked
//!
//! Hot-path routines do not defensively validate their inputs: out-of-range
//! row ids, mismatched buffer lengths, unsorted subsets passed to sparse
//! entry points, or invalid policy combinations may panic on a bounds check
//! or silently produce wrong partitions. These contracts are the caller's
//! responsibility and are only spot-checked via `debug_assert!`.
//!
//! # Determinism
//!
//! Every randomized routine takes a caller-seeded [`rand::Rng`] and is
//! reproducible for a fixed seed and thread count. Parallel distance
//! accumulation merges per-tree counters in pool scheduling order, so sums
//! may differ across runs in the last floating-point bits; this is accepted
//! behavior, not a bug.

pub mod distance;
pub mod error;
pub mod interrupt;
pub mod parallel;
pub mod sampling;
pub mod split;
pub mod stats;
pub mod subset;

pub use error::CoreError;
pub use parallel::{run_with_threads, Parallelism};
