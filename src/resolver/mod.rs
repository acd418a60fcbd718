//! Module resolution.
//!
//! Runs a platform resolver over every discovered package on a bounded
//! worker pool, then merges the per-package descriptors into one graph.
//! Every configuration error is collected so one run reports all of them.

pub mod errors;
pub mod merge;

pub use errors::{AutolinkError, AutolinkErrors};
pub use merge::{merge_graph, BuildFromSource, ResolvedGraph};

use crate::core::descriptor::ModuleDescriptor;
use crate::core::package::Package;
use crate::platforms::PlatformResolver;
use crate::util::pool::task_all;

/// Resolve `packages` with at most `jobs` workers.
///
/// Descriptors come back in package order; packages with nothing to link
/// are dropped. Packages that fail are left out and their errors returned
/// alongside, so a caller can still merge what did resolve. `on_resolved`
/// is called from the workers after each package.
pub fn resolve_modules<F>(
    packages: &[Package],
    resolver: &dyn PlatformResolver,
    jobs: Option<usize>,
    on_resolved: F,
) -> (Vec<ModuleDescriptor>, AutolinkErrors)
where
    F: Fn(&Package) + Sync + Send,
{
    let mut errors = AutolinkErrors::new();
    let mut descriptors = Vec::new();

    let results = match task_all(packages, jobs, |package| {
        let result = resolver.resolve_module(package);
        on_resolved(package);
        result
    }) {
        Ok(results) => results,
        Err(e) => {
            errors.push(AutolinkError::WorkerPool {
                message: format!("{:#}", e),
            });
            return (descriptors, errors);
        }
    };

    for result in results {
        match result {
            Ok(Some(descriptor)) => descriptors.push(descriptor),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    tracing::debug!(
        "resolved {} of {} packages for {}",
        descriptors.len(),
        packages.len(),
        resolver.platform()
    );
    (descriptors, errors)
}
