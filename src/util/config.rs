//! Autolinking options.
//!
//! Options come from three layers:
//! - Defaults
//! - The project's `package.json`, under `expo.autolinking` (with per-platform
//!   sub-objects such as `expo.autolinking.android` overriding the common ones)
//! - Command-line flags
//!
//! Later layers take precedence over earlier ones.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::core::package::PackageJson;
use crate::core::platform::Platform;

/// Default directory of project-local native modules.
pub const DEFAULT_NATIVE_MODULES_DIR: &str = "modules";

/// One layer of options, as written in `package.json` or built from CLI flags.
///
/// Every field is optional so layers can be merged; a set field wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAutolinkingOptions {
    /// Directories to search for packages, relative to the project root
    pub search_paths: Option<Vec<PathBuf>>,

    /// Local native modules directory; `null` disables it
    #[serde(deserialize_with = "deserialize_some")]
    pub native_modules_dir: Option<Option<PathBuf>>,

    /// Package names to leave out
    pub exclude: Option<Vec<String>>,

    /// Package name regexes (matched against the whole name) to build from
    /// source instead of prebuilt artifacts
    pub build_from_source: Option<Vec<String>>,

    /// Restrict results to the project's transitive dependencies
    pub only_project_deps: Option<bool>,

    /// Extra flags passed through to Apple descriptors
    pub flags: Option<serde_json::Map<String, serde_json::Value>>,

    pub android: Option<Box<RawAutolinkingOptions>>,
    pub ios: Option<Box<RawAutolinkingOptions>>,
    pub apple: Option<Box<RawAutolinkingOptions>>,
    pub macos: Option<Box<RawAutolinkingOptions>>,
    pub tvos: Option<Box<RawAutolinkingOptions>>,
}

/// Distinguish an explicit `null` from an absent key.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl RawAutolinkingOptions {
    /// Read the `expo.autolinking` object of a `package.json`.
    pub fn from_package_json(package_json: &PackageJson) -> Result<Self, String> {
        let Some(autolinking) = package_json
            .expo
            .as_ref()
            .and_then(|expo| expo.get("autolinking"))
        else {
            return Ok(Self::default());
        };

        serde_json::from_value(autolinking.clone())
            .map_err(|e| format!("invalid `expo.autolinking` options: {}", e))
    }

    /// Merge another layer into this one (other takes precedence).
    pub fn merge(&mut self, other: RawAutolinkingOptions) {
        if other.search_paths.is_some() {
            self.search_paths = other.search_paths;
        }
        if other.native_modules_dir.is_some() {
            self.native_modules_dir = other.native_modules_dir;
        }
        if other.exclude.is_some() {
            self.exclude = other.exclude;
        }
        if other.build_from_source.is_some() {
            self.build_from_source = other.build_from_source;
        }
        if other.only_project_deps.is_some() {
            self.only_project_deps = other.only_project_deps;
        }
        if other.flags.is_some() {
            self.flags = other.flags;
        }
    }

    /// The common options with the platform-specific sub-object applied.
    ///
    /// For Apple platforms `apple` applies first, then the platform's own key.
    pub fn for_platform(&self, platform: Platform) -> RawAutolinkingOptions {
        let mut merged = self.clone();
        merged.android = None;
        merged.ios = None;
        merged.apple = None;
        merged.macos = None;
        merged.tvos = None;

        let mut layers: Vec<&RawAutolinkingOptions> = Vec::new();
        if platform.is_apple() {
            layers.extend(self.apple.as_deref());
        }
        let own = match platform {
            Platform::Android => self.android.as_deref(),
            Platform::Ios => self.ios.as_deref(),
            Platform::Macos => self.macos.as_deref(),
            Platform::Tvos => self.tvos.as_deref(),
        };
        layers.extend(own);

        for layer in layers {
            merged.merge(layer.clone());
        }
        merged
    }

    /// Resolve into final options for a project rooted at `project_root`.
    pub fn resolve(self, project_root: &Path) -> AutolinkingOptions {
        let search_paths = match self.search_paths {
            Some(paths) => paths.iter().map(|p| project_root.join(p)).collect(),
            None => default_search_paths(project_root),
        };

        let native_modules_dir = match self.native_modules_dir {
            Some(Some(dir)) => Some(project_root.join(dir)),
            Some(None) => None,
            None => Some(project_root.join(DEFAULT_NATIVE_MODULES_DIR)),
        };

        AutolinkingOptions {
            search_paths,
            native_modules_dir,
            exclude: self.exclude.unwrap_or_default(),
            build_from_source: self.build_from_source.unwrap_or_default(),
            only_project_deps: self.only_project_deps.unwrap_or(true),
            flags: self.flags.unwrap_or_default(),
        }
    }
}

/// Final options for one resolution run.
#[derive(Debug, Clone, PartialEq)]
pub struct AutolinkingOptions {
    /// Absolute search paths, highest precedence first
    pub search_paths: Vec<PathBuf>,

    /// Absolute local native modules directory, if enabled
    pub native_modules_dir: Option<PathBuf>,

    pub exclude: Vec<String>,

    pub build_from_source: Vec<String>,

    pub only_project_deps: bool,

    pub flags: serde_json::Map<String, serde_json::Value>,
}

impl AutolinkingOptions {
    /// Options with defaults for `project_root`.
    pub fn defaults(project_root: &Path) -> Self {
        RawAutolinkingOptions::default().resolve(project_root)
    }
}

/// Every `node_modules` directory from `project_root` up to the filesystem root.
///
/// Nearer directories come first, mirroring Node's module lookup.
pub fn default_search_paths(project_root: &Path) -> Vec<PathBuf> {
    project_root
        .ancestors()
        .map(|dir| dir.join("node_modules"))
        .filter(|dir| dir.is_dir())
        .collect()
}

/// Summarize options as key/value pairs for display.
pub fn describe(options: &AutolinkingOptions) -> BTreeMap<&'static str, String> {
    let mut out = BTreeMap::new();
    out.insert(
        "searchPaths",
        options
            .search_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    );
    out.insert(
        "nativeModulesDir",
        options
            .native_modules_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(disabled)".to_string()),
    );
    out.insert("exclude", options.exclude.join(", "));
    out.insert("buildFromSource", options.build_from_source.join(", "));
    out.insert("onlyProjectDeps", options.only_project_deps.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn package_json(json: &str) -> PackageJson {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("node_modules")).unwrap();

        let options = AutolinkingOptions::defaults(tmp.path());
        assert_eq!(options.search_paths.first(), Some(&tmp.path().join("node_modules")));
        assert_eq!(options.native_modules_dir, Some(tmp.path().join("modules")));
        assert!(options.only_project_deps);
        assert!(options.exclude.is_empty());
    }

    #[test]
    fn test_from_package_json() {
        let pj = package_json(
            r#"{
                "name": "app",
                "expo": {
                    "autolinking": {
                        "searchPaths": ["../../packages"],
                        "exclude": ["expo-foo"],
                        "nativeModulesDir": null,
                        "android": { "exclude": ["expo-bar"], "buildFromSource": [".*"] }
                    }
                }
            }"#,
        );

        let raw = RawAutolinkingOptions::from_package_json(&pj).unwrap();
        let android = raw.for_platform(Platform::Android).resolve(Path::new("/app"));
        assert_eq!(android.search_paths, vec![PathBuf::from("/app/../../packages")]);
        assert_eq!(android.exclude, vec!["expo-bar"]);
        assert_eq!(android.build_from_source, vec![".*"]);
        assert_eq!(android.native_modules_dir, None);

        let ios = raw.for_platform(Platform::Ios).resolve(Path::new("/app"));
        assert_eq!(ios.exclude, vec!["expo-foo"]);
        assert!(ios.build_from_source.is_empty());
    }

    #[test]
    fn test_apple_layer_applies_before_platform_layer() {
        let pj = package_json(
            r#"{ "expo": { "autolinking": {
                "apple": { "exclude": ["a"], "flags": { "inhibit_warnings": true } },
                "macos": { "exclude": ["m"] }
            } } }"#,
        );
        let raw = RawAutolinkingOptions::from_package_json(&pj).unwrap();

        let macos = raw.for_platform(Platform::Macos).resolve(Path::new("/app"));
        assert_eq!(macos.exclude, vec!["m"]);
        assert_eq!(macos.flags.get("inhibit_warnings"), Some(&serde_json::Value::Bool(true)));

        let ios = raw.for_platform(Platform::Ios).resolve(Path::new("/app"));
        assert_eq!(ios.exclude, vec!["a"]);
    }

    #[test]
    fn test_cli_layer_wins() {
        let mut raw = RawAutolinkingOptions {
            exclude: Some(vec!["from-config".to_string()]),
            only_project_deps: Some(true),
            ..Default::default()
        };
        raw.merge(RawAutolinkingOptions {
            exclude: Some(vec!["from-cli".to_string()]),
            ..Default::default()
        });

        let options = raw.resolve(Path::new("/app"));
        assert_eq!(options.exclude, vec!["from-cli"]);
        assert!(options.only_project_deps);
    }

    #[test]
    fn test_invalid_options_are_reported() {
        let pj = package_json(r#"{ "expo": { "autolinking": { "exclude": "expo-foo" } } }"#);
        let err = RawAutolinkingOptions::from_package_json(&pj).unwrap_err();
        assert!(err.contains("expo.autolinking"));
    }

    #[test]
    fn test_describe() {
        let options = RawAutolinkingOptions {
            native_modules_dir: Some(None),
            ..Default::default()
        }
        .resolve(Path::new("/app"));
        let described = describe(&options);
        assert_eq!(described["nativeModulesDir"], "(disabled)");
        assert_eq!(described["onlyProjectDeps"], "true");
    }
}
