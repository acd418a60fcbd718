//! Package - an installed dependency with its optional module config.
//!
//! Packages are created during discovery and never change afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::module_config::ModuleConfig;
use crate::resolver::AutolinkError;

/// File name of an npm package manifest.
pub const PACKAGE_JSON: &str = "package.json";

/// The fields of `package.json` autolinking cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, serde_json::Value>,

    /// The `expo` field; only its `autolinking` sub-object is read
    #[serde(default)]
    pub expo: Option<serde_json::Value>,
}

impl PackageJson {
    /// Load `package.json` from a package directory.
    ///
    /// Returns `Ok(None)` when the directory has no `package.json`.
    pub fn load(package_dir: &Path) -> Result<Option<Self>, AutolinkError> {
        let path = package_dir.join(PACKAGE_JSON);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(AutolinkError::Io { path, source }),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| AutolinkError::InvalidPackageJson {
                path,
                message: e.to_string(),
            })
    }

    /// Names of the dependencies installed along with this package:
    /// `dependencies`, `peerDependencies` and `optionalDependencies`.
    pub fn dependency_names(&self) -> Vec<&str> {
        collect_names(&[
            &self.dependencies,
            &self.peer_dependencies,
            &self.optional_dependencies,
        ])
    }

    /// [`dependency_names`](Self::dependency_names) plus `devDependencies`.
    ///
    /// Only meaningful for the project itself; a library's dev dependencies
    /// are never installed for its dependents.
    pub fn all_dependency_names(&self) -> Vec<&str> {
        collect_names(&[
            &self.dependencies,
            &self.dev_dependencies,
            &self.peer_dependencies,
            &self.optional_dependencies,
        ])
    }
}

/// Keys of `maps` in order, deduplicated.
fn collect_names<'a>(maps: &[&'a BTreeMap<String, serde_json::Value>]) -> Vec<&'a str> {
    let mut names: Vec<&str> = Vec::new();
    for map in maps {
        for name in map.keys() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
    }
    names
}

/// A discovered package.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    version: String,
    path: PathBuf,
    module_config: Option<ModuleConfig>,
}

impl Package {
    /// Create a package from its parts.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        path: PathBuf,
        module_config: Option<ModuleConfig>,
    ) -> Self {
        Package {
            name: name.into(),
            version: version.into(),
            path,
            module_config,
        }
    }

    /// Load the package rooted at `dir`.
    ///
    /// The name comes from `package.json`, falling back to `fallback_name`
    /// (the directory name for local modules without a manifest). Returns
    /// `Ok(None)` when neither a `package.json` nor a module config exists.
    pub fn load(dir: &Path, fallback_name: &str) -> Result<Option<Self>, AutolinkError> {
        let package_json = PackageJson::load(dir)?;
        if package_json.is_none() && ModuleConfig::find(dir).is_none() {
            return Ok(None);
        }
        let package_json = package_json.unwrap_or_default();

        let name = package_json
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        let version = package_json.version.unwrap_or_default();
        let module_config = ModuleConfig::load(&name, dir)?;

        Ok(Some(Package::new(name, version, dir.to_path_buf(), module_config)))
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the package version (empty when `package.json` has none).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the package root directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the module config, if the package declares one.
    pub fn module_config(&self) -> Option<&ModuleConfig> {
        self.module_config.as_ref()
    }

    /// Check if the package declares native capabilities.
    pub fn has_module_config(&self) -> bool {
        self.module_config.is_some()
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}@{}", self.name, self.version)
        }
    }
}

/// Another install of an already discovered package that lost to hoisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRevision {
    pub path: PathBuf,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_load() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("package.json"),
            r#"{ "name": "expo-foo", "version": "1.2.3" }"#,
        )
        .unwrap();
        std::fs::write(tmp.path().join("expo-module.config.json"), "{}").unwrap();

        let pkg = Package::load(tmp.path(), "dir-name").unwrap().unwrap();
        assert_eq!(pkg.name(), "expo-foo");
        assert_eq!(pkg.version(), "1.2.3");
        assert!(pkg.has_module_config());
        assert_eq!(pkg.to_string(), "expo-foo@1.2.3");
    }

    #[test]
    fn test_package_without_manifest_uses_fallback_name() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("expo-module.config.json"), "{}").unwrap();

        let pkg = Package::load(tmp.path(), "local-module").unwrap().unwrap();
        assert_eq!(pkg.name(), "local-module");
        assert_eq!(pkg.version(), "");
    }

    #[test]
    fn test_package_without_anything_is_skipped() {
        let tmp = TempDir::new().unwrap();
        assert!(Package::load(tmp.path(), "nothing").unwrap().is_none());
    }

    #[test]
    fn test_invalid_package_json() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("package.json"), "{ \"name\": ").unwrap();

        let err = Package::load(tmp.path(), "broken").unwrap_err();
        assert!(matches!(err, AutolinkError::InvalidPackageJson { .. }));
    }

    #[test]
    fn test_dependency_names() {
        let pj: PackageJson = serde_json::from_str(
            r#"{
                "dependencies": { "b": "1", "a": "1" },
                "devDependencies": { "a": "1", "c": "1" },
                "peerDependencies": { "d": "*" }
            }"#,
        )
        .unwrap();

        assert_eq!(pj.all_dependency_names(), vec!["a", "b", "c", "d"]);
        assert_eq!(pj.dependency_names(), vec!["a", "b", "d"]);
    }
}
