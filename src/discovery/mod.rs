//! Package discovery.
//!
//! Finds installed packages under the search paths and loads their module
//! configs. Search paths are visited in precedence order; when the same
//! package name turns up again further down the list, the first (nearest,
//! hoisted) install wins and later ones are recorded as duplicates.

mod project_deps;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::core::module_config::CONFIG_FILE_NAMES;
use crate::core::package::{DuplicateRevision, Package, PACKAGE_JSON};
use crate::core::project::Project;
use crate::resolver::AutolinkErrors;
use crate::util::fs::{glob_files, normalize_path, relative_path, to_slash};

pub use project_deps::{filter_to_project_dependencies, resolve_node_package};

/// Layout of a directory being searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchPathKind {
    /// `node_modules`-style: packages at `<name>` or `@<scope>/<name>`
    NodeModules,
    /// The project's local native modules directory
    NativeModules,
}

impl SearchPathKind {
    fn marker_patterns(&self) -> Vec<String> {
        let markers = std::iter::once(PACKAGE_JSON).chain(CONFIG_FILE_NAMES);
        match self {
            SearchPathKind::NodeModules => markers
                .flat_map(|m| [format!("*/{}", m), format!("@*/*/{}", m)])
                .collect(),
            SearchPathKind::NativeModules => {
                let mut patterns: Vec<String> = markers.map(|m| format!("*/{}", m)).collect();
                patterns.extend(CONFIG_FILE_NAMES.iter().map(|m| format!("*/*/{}", m)));
                patterns
            }
        }
    }
}

/// The outcome of package discovery.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Winning packages, sorted by name
    packages: Vec<Package>,

    /// Installs that lost to an earlier one, by package name
    duplicates: BTreeMap<String, Vec<DuplicateRevision>>,
}

impl SearchResults {
    /// Get the discovered packages in deterministic (name) order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Consume the results, keeping only the packages.
    pub fn into_packages(self) -> Vec<Package> {
        self.packages
    }

    /// Get duplicate installs, by package name.
    pub fn duplicates(&self) -> &BTreeMap<String, Vec<DuplicateRevision>> {
        &self.duplicates
    }

    /// Look up a package by name.
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name() == name)
    }

    /// Number of discovered packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Accumulates packages across search paths, applying hoisting precedence.
#[derive(Default)]
struct Collector {
    packages: BTreeMap<String, Package>,
    duplicates: BTreeMap<String, Vec<DuplicateRevision>>,
    errors: AutolinkErrors,

    /// Normalized directories whose package failed to load
    failed: HashSet<PathBuf>,
}

impl Collector {
    fn scan(&mut self, search_path: &Path, kind: SearchPathKind) {
        if !search_path.is_dir() {
            tracing::debug!("search path {} does not exist", search_path.display());
            return;
        }

        let patterns = kind.marker_patterns();
        let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
        let markers = match glob_files(search_path, &patterns) {
            Ok(markers) => markers,
            Err(e) => {
                tracing::warn!("skipping search path {}: {:#}", search_path.display(), e);
                return;
            }
        };

        let package_dirs: BTreeSet<PathBuf> = markers
            .iter()
            .filter_map(|marker| marker.parent())
            .filter(|dir| !is_hidden(&relative_path(search_path, dir)))
            .map(Path::to_path_buf)
            .collect();

        for dir in package_dirs {
            let fallback_name = match kind {
                SearchPathKind::NodeModules => to_slash(&relative_path(search_path, &dir)),
                SearchPathKind::NativeModules => dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };

            match Package::load(&dir, &fallback_name) {
                Ok(Some(package)) => self.add(package),
                Ok(None) => {}
                Err(e) => {
                    self.failed.insert(normalize_path(&dir));
                    self.errors.push(e);
                }
            }
        }
    }

    fn add(&mut self, package: Package) {
        match self.packages.get(package.name()) {
            Some(existing) if normalize_path(existing.path()) == normalize_path(package.path()) => {}
            Some(existing) => {
                tracing::debug!(
                    "`{}` at {} is shadowed by {}",
                    package.name(),
                    package.path().display(),
                    existing.path().display()
                );
                self.duplicates
                    .entry(package.name().to_string())
                    .or_default()
                    .push(DuplicateRevision {
                        path: package.path().to_path_buf(),
                        version: package.version().to_string(),
                    });
            }
            None => {
                self.packages.insert(package.name().to_string(), package);
            }
        }
    }
}

fn is_hidden(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

/// Discover every package under `search_paths`, in precedence order.
///
/// Relative search paths are taken relative to `project_root`. Packages are
/// listed whether or not they declare a module config.
pub fn discover_packages(
    project_root: &Path,
    search_paths: &[PathBuf],
) -> Result<SearchResults, AutolinkErrors> {
    let mut collector = Collector::default();
    for search_path in search_paths {
        collector.scan(&project_root.join(search_path), SearchPathKind::NodeModules);
    }
    let (results, errors) = finish(collector, |_| true);
    errors.into_result(results)
}

/// Discover the packages to link for `project`, failing on any error.
///
/// See [`collect_packages`].
pub fn find_packages(project: &Project) -> Result<SearchResults, AutolinkErrors> {
    let (results, errors) = collect_packages(project);
    errors.into_result(results)
}

/// Discover the packages to link for `project`.
///
/// The local native modules directory is searched before the search paths,
/// excluded names are dropped and, unless disabled, only packages the
/// project transitively depends on are kept. Packages that failed to load
/// are left out of the results and reported once each in the errors, so
/// callers can carry on with the rest.
pub fn collect_packages(project: &Project) -> (SearchResults, AutolinkErrors) {
    let options = project.options();
    let mut collector = Collector::default();

    if let Some(ref dir) = options.native_modules_dir {
        collector.scan(dir, SearchPathKind::NativeModules);
    }
    let local: BTreeSet<String> = collector.packages.keys().cloned().collect();

    for search_path in &options.search_paths {
        collector.scan(search_path, SearchPathKind::NodeModules);
    }

    if options.only_project_deps {
        let found = std::mem::take(&mut collector.packages);
        let (mut filtered, errors) = filter_to_project_dependencies(project.root(), &found, &collector.failed);
        for name in &local {
            if let Some(package) = found.get(name) {
                filtered.insert(name.clone(), package.clone());
            }
        }
        collector.duplicates.retain(|name, _| filtered.contains_key(name));
        collector.packages = filtered;
        collector.errors.extend(errors);
    }

    let exclude = &options.exclude;
    finish(collector, |name| !exclude.iter().any(|e| e == name))
}

fn finish(collector: Collector, keep: impl Fn(&str) -> bool) -> (SearchResults, AutolinkErrors) {
    let Collector {
        packages,
        mut duplicates,
        errors,
        ..
    } = collector;

    let packages: Vec<Package> = packages
        .into_values()
        .filter(|p| {
            let kept = keep(p.name());
            if !kept {
                tracing::debug!("excluding `{}`", p.name());
            }
            kept
        })
        .collect();
    duplicates.retain(|name, _| packages.iter().any(|p| p.name() == name));

    for (name, revisions) in &duplicates {
        tracing::warn!(
            "found {} duplicate install(s) of `{}`; using the first one found",
            revisions.len(),
            name
        );
    }

    (
        SearchResults {
            packages,
            duplicates,
        },
        errors,
    )
}
