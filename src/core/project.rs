//! Project - the app being autolinked.
//!
//! A Project is the root `package.json` plus the options that apply to one
//! platform. It is passed explicitly to every stage so that resolution never
//! depends on ambient state such as the current directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::package::{PackageJson, PACKAGE_JSON};
use crate::core::platform::Platform;
use crate::resolver::AutolinkError;
use crate::util::config::{AutolinkingOptions, RawAutolinkingOptions};

/// Errors locating a project root.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("could not find package.json in {} or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },
}

/// Find the nearest directory at or above `start` that contains `package.json`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, ProjectError> {
    start
        .ancestors()
        .find(|dir| dir.join(PACKAGE_JSON).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| ProjectError::NotFound {
            dir: start.to_path_buf(),
        })
}

/// The app project being autolinked for one platform.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    package_json: PackageJson,
    platform: Platform,
    options: AutolinkingOptions,
}

impl Project {
    /// Load the project at `root` for `platform`.
    ///
    /// `overrides` is the command-line layer; it wins over `package.json`.
    pub fn load(
        root: &Path,
        platform: Platform,
        overrides: RawAutolinkingOptions,
    ) -> Result<Self, AutolinkError> {
        let package_json_path = root.join(PACKAGE_JSON);
        let package_json = PackageJson::load(root)?.ok_or_else(|| AutolinkError::InvalidPackageJson {
            path: package_json_path.clone(),
            message: "file not found".to_string(),
        })?;

        let mut raw = RawAutolinkingOptions::from_package_json(&package_json)
            .map_err(|message| AutolinkError::InvalidPackageJson {
                path: package_json_path,
                message,
            })?
            .for_platform(platform);
        raw.merge(overrides);

        Ok(Project {
            root: root.to_path_buf(),
            options: raw.resolve(root),
            package_json,
            platform,
        })
    }

    /// Create a project from already resolved parts.
    pub fn from_parts(root: PathBuf, platform: Platform, options: AutolinkingOptions) -> Self {
        Project {
            root,
            package_json: PackageJson::default(),
            platform,
            options,
        }
    }

    /// Get the project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the project's `package.json`.
    pub fn package_json(&self) -> &PackageJson {
        &self.package_json
    }

    /// Get the platform this project is being linked for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Get the resolved options.
    pub fn options(&self) -> &AutolinkingOptions {
        &self.options
    }

    /// Root of the platform's native project (`android/`, `ios/`, `macos/`).
    pub fn native_root(&self) -> PathBuf {
        self.root.join(self.platform.native_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_project_root_walks_up() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("package.json"), "{}").unwrap();
        let nested = tmp.path().join("android/app");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested).unwrap(), tmp.path());
    }

    #[test]
    fn test_project_load_applies_overrides() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("package.json"),
            r#"{ "name": "app", "expo": { "autolinking": { "exclude": ["a"], "onlyProjectDeps": false } } }"#,
        )
        .unwrap();

        let overrides = RawAutolinkingOptions {
            exclude: Some(vec!["b".to_string()]),
            ..Default::default()
        };
        let project = Project::load(tmp.path(), Platform::Android, overrides).unwrap();

        assert_eq!(project.options().exclude, vec!["b"]);
        assert!(!project.options().only_project_deps);
        assert_eq!(project.native_root(), tmp.path().join("android"));
        assert_eq!(project.package_json().name.as_deref(), Some("app"));
    }

    #[test]
    fn test_project_load_requires_package_json() {
        let tmp = TempDir::new().unwrap();
        let err = Project::load(tmp.path(), Platform::Ios, RawAutolinkingOptions::default()).unwrap_err();
        assert!(matches!(err, AutolinkError::InvalidPackageJson { .. }));
    }
}
