//! Filtering discovered packages down to the project's dependency tree.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::core::package::{Package, PackageJson, PACKAGE_JSON};
use crate::resolver::AutolinkErrors;
use crate::util::fs::normalize_path;

/// Resolve `name` the way Node does from `from_dir`: the first
/// `node_modules/<name>` with a `package.json` in `from_dir` or an ancestor.
pub fn resolve_node_package(from_dir: &Path, name: &str) -> Option<PathBuf> {
    from_dir
        .ancestors()
        .map(|dir| dir.join("node_modules").join(name))
        .find(|candidate| candidate.join(PACKAGE_JSON).is_file())
}

/// Keep only packages reachable from the project's `package.json`.
///
/// Walks `dependencies`, `peerDependencies` and `optionalDependencies`
/// breadth first; `devDependencies` count for the project itself only,
/// since a library's dev dependencies are never installed for the app. A
/// dependency already in `found` uses that install; otherwise it is resolved
/// Node-style from its dependent, which picks up nested installs the search
/// paths missed. Directories in `failed` already reported a load error and
/// are not loaded again.
pub fn filter_to_project_dependencies(
    project_root: &Path,
    found: &BTreeMap<String, Package>,
    failed: &HashSet<PathBuf>,
) -> (BTreeMap<String, Package>, AutolinkErrors) {
    let mut kept: BTreeMap<String, Package> = BTreeMap::new();
    let mut errors = AutolinkErrors::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::from([project_root.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        if !visited.insert(normalize_path(&dir)) {
            continue;
        }

        let package_json = match PackageJson::load(&dir) {
            Ok(Some(package_json)) => package_json,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!("not following dependencies of {}: {}", dir.display(), e);
                continue;
            }
        };

        let deps = if dir == project_root {
            package_json.all_dependency_names()
        } else {
            package_json.dependency_names()
        };
        for dep in deps {
            if kept.contains_key(dep) {
                continue;
            }

            if let Some(package) = found.get(dep) {
                queue.push_back(package.path().to_path_buf());
                kept.insert(dep.to_string(), package.clone());
                continue;
            }

            let Some(dep_dir) = resolve_node_package(&dir, dep) else {
                tracing::debug!("dependency `{}` of {} is not installed", dep, dir.display());
                continue;
            };
            if failed.contains(&normalize_path(&dep_dir)) {
                continue;
            }
            match Package::load(&dep_dir, dep) {
                Ok(Some(package)) => {
                    kept.insert(dep.to_string(), package);
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
            queue.push_back(dep_dir);
        }
    }

    (kept, errors)
}
