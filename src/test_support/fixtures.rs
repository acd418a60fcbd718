//! Fixtures for project trees and native sources.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::platform::Platform;
use crate::core::project::Project;
use crate::util::config::RawAutolinkingOptions;

/// An app project in a temp directory, deleted on drop.
///
/// The root holds a `package.json` depending on the given packages and an
/// empty `node_modules`.
#[derive(Debug)]
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Create an app depending on `dependencies`.
    pub fn new(dependencies: &[&str]) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let fixture = ProjectFixture { dir };
        fixture.write("package.json", &package_json("app", "1.0.0", dependencies));
        std::fs::create_dir_all(fixture.root().join("node_modules")).expect("failed to create node_modules");
        fixture
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("failed to write fixture file");
        path
    }

    /// Install a package into the root `node_modules`.
    ///
    /// `config` is written as `expo-module.config.json` when given. Returns
    /// the package directory.
    pub fn add_package(&self, name: &str, version: &str, config: Option<&str>) -> PathBuf {
        self.add_package_with_deps(name, version, config, &[])
    }

    /// Install a package that depends on `dependencies`.
    pub fn add_package_with_deps(
        &self,
        name: &str,
        version: &str,
        config: Option<&str>,
        dependencies: &[&str],
    ) -> PathBuf {
        self.install("node_modules", name, version, config, dependencies)
    }

    /// Install a package into `modules_dir` (relative to the root).
    pub fn add_package_in(&self, modules_dir: &str, name: &str, version: &str, config: Option<&str>) -> PathBuf {
        self.install(modules_dir, name, version, config, &[])
    }

    fn install(
        &self,
        modules_dir: &str,
        name: &str,
        version: &str,
        config: Option<&str>,
        dependencies: &[&str],
    ) -> PathBuf {
        let base = format!("{}/{}", modules_dir, name);
        self.write(&format!("{}/package.json", base), &package_json(name, version, dependencies));
        if let Some(config) = config {
            self.write(&format!("{}/expo-module.config.json", base), config);
        }
        self.root().join(modules_dir).join(name)
    }

    /// Load the fixture as a project for `platform`.
    pub fn project(&self, platform: Platform, overrides: RawAutolinkingOptions) -> Project {
        Project::load(self.root(), platform, overrides).expect("failed to load fixture project")
    }
}

/// A `package.json` with the given dependencies at version `*`.
pub fn package_json(name: &str, version: &str, dependencies: &[&str]) -> String {
    let deps: serde_json::Map<String, serde_json::Value> = dependencies
        .iter()
        .map(|d| (d.to_string(), serde_json::Value::String("*".to_string())))
        .collect();
    let json = serde_json::json!({
        "name": name,
        "version": version,
        "dependencies": deps,
    });
    serde_json::to_string_pretty(&json).expect("package.json serializes")
}

/// Kotlin source of a package class in `package`.
pub fn kotlin_package_source(package: &str, class: &str) -> String {
    format!(
        "package {}\n\nimport expo.modules.core.interfaces.Package\n\nclass {} : Package\n",
        package, class
    )
}

/// Java source of a legacy package class in `package`.
pub fn java_package_source(package: &str, class: &str) -> String {
    format!(
        "package {};\n\nimport org.unimodules.core.BasePackage;\n\npublic class {} extends BasePackage {{}}\n",
        package, class
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_layout() {
        let fixture = ProjectFixture::new(&["expo-foo"]);
        let dir = fixture.add_package("@expo/foo", "1.0.0", Some("{}"));

        assert!(fixture.root().join("package.json").is_file());
        assert_eq!(dir, fixture.root().join("node_modules/@expo/foo"));
        assert!(dir.join("expo-module.config.json").is_file());

        let root: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(fixture.root().join("package.json")).unwrap()).unwrap();
        assert_eq!(root["dependencies"]["expo-foo"], "*");
    }

    #[test]
    fn test_sources_carry_marker_imports() {
        assert!(kotlin_package_source("a.b", "C").contains("import expo.modules.core.interfaces.Package"));
        assert!(java_package_source("a.b", "C").starts_with("package a.b;"));
    }
}
