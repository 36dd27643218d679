//! Parallelism configuration.
//!
//! The canonical data-parallel unit is one tree per worker (construction,
//! scoring, distance accumulation alike). Components never manage thread
//! pools themselves; the embedding layer sets one up via
//! [`run_with_threads`] and passes the resulting [`Parallelism`] flag down.

use rayon::prelude::*;

/// Whether parallel execution is allowed.
///
/// When `Parallel`, components may use `rayon` parallel iterators; when
/// `Sequential`, they must iterate serially. Note that parallel distance
/// accumulation merges per-tree scratch counters in nondeterministic order,
/// so repeated runs can differ in the last floating-point bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if the rayon pool has multiple threads)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    #[inline]
    pub fn maybe_par_for_each<T, I, F>(self, iter: I, f: F)
    where
        T: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().for_each(f);
        } else {
            iter.into_iter().for_each(f);
        }
    }

    /// Per-worker state variant of [`maybe_par_for_each`](Self::maybe_par_for_each):
    /// `init` runs once per worker thread (or once total when sequential) and
    /// the state is reused across that worker's items. Used for per-tree
    /// scratch counters and sampling buffers.
    #[inline]
    pub fn maybe_par_for_each_init<T, I, INIT, S, F>(self, iter: I, init: INIT, f: F)
    where
        T: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        INIT: Fn() -> S + Sync + Send,
        F: Fn(&mut S, T) + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().for_each_init(init, f);
        } else {
            let mut state = init();
            iter.into_iter().for_each(|item| f(&mut state, item));
        }
    }

    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}

/// Run a closure with the appropriate thread pool.
///
/// Thread count semantics: `0` = auto (all available cores), `1` =
/// sequential (no pool), `n > 1` = exactly `n` threads.
#[inline]
pub fn run_with_threads<T: Send>(
    n_threads: usize,
    f: impl FnOnce(Parallelism) -> T + Send,
) -> T {
    let parallelism = Parallelism::from_threads(n_threads);

    match parallelism {
        Parallelism::Sequential => f(Parallelism::Sequential),
        Parallelism::Parallel => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()
                .expect("Failed to create thread pool");
            pool.install(|| f(Parallelism::Parallel))
        }
    }
}
