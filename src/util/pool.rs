//! Bounded worker pool for fan-out over packages.

use anyhow::{Context, Result};
use rayon::prelude::*;

/// Upper bound on worker threads when no explicit job count is given.
///
/// Resolution is dominated by directory reads; more workers than this only
/// adds open file handles.
pub const MAX_DEFAULT_JOBS: usize = 8;

/// Default number of workers: available parallelism capped at [`MAX_DEFAULT_JOBS`].
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_JOBS)
}

/// Run `f` over every item on a pool of at most `jobs` workers.
///
/// Results come back in the order of `items`, whatever order the workers
/// finish in.
pub fn task_all<T, R, F>(items: &[T], jobs: Option<usize>, f: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    let jobs = jobs.filter(|&j| j > 0).unwrap_or_else(default_jobs);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("autolinking-worker-{}", i))
        .build()
        .context("failed to start resolver worker pool")?;

    Ok(pool.install(|| items.par_iter().map(&f).collect()))
}
