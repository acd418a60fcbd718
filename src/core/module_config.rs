//! Module config parsing and schema.
//!
//! A package declares its native capabilities in `expo-module.config.json`
//! (or the legacy `unimodule.json`) at its root. The shape is validated on
//! load; anything that doesn't fit becomes a configuration error instead of
//! flowing deeper into resolution.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::platform::Platform;
use crate::resolver::AutolinkError;

/// Config file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["expo-module.config.json", "unimodule.json"];

/// Platform name that covers every Apple platform.
const APPLE_FAMILY: &str = "apple";

/// A string or a list of strings (`"podspecPath": "ios/Foo.podspec"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flatten into a list.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s.clone()],
            OneOrMany::Many(v) => v.clone(),
        }
    }
}

/// Maven publication of a prebuilt Android project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub repository: String,
}

/// A Gradle plugin shipped with a package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradlePluginConfig {
    pub id: String,
    pub group: String,
    pub source_dir: String,
    #[serde(default)]
    pub apply_to_root_project: Option<bool>,
}

/// A prebuilt AAR wrapped as its own Gradle project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AarProjectConfig {
    pub name: String,
    pub aar_file_path: String,
}

/// An explicitly declared Android sub-project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidProjectConfig {
    /// Gradle project name; derived from the package name and path when absent
    #[serde(default)]
    pub name: Option<String>,

    /// Directory containing the project's build file, relative to the package root
    pub path: String,

    #[serde(default)]
    pub modules: Vec<String>,

    #[serde(default)]
    pub services: Vec<String>,

    #[serde(default)]
    pub publication: Option<Publication>,

    #[serde(default)]
    pub gradle_aar_projects: Vec<AarProjectConfig>,

    #[serde(default)]
    pub should_use_publication_script_path: Option<String>,
}

/// The `android` block of a module config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidConfig {
    /// Directory of the default project (defaults to `android`)
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub modules: Vec<String>,

    #[serde(default)]
    pub services: Vec<String>,

    #[serde(default)]
    pub projects: Vec<AndroidProjectConfig>,

    #[serde(default)]
    pub gradle_plugins: Vec<GradlePluginConfig>,

    #[serde(default)]
    pub gradle_aar_projects: Vec<AarProjectConfig>,

    #[serde(default)]
    pub publication: Option<Publication>,

    #[serde(default)]
    pub should_use_publication_script_path: Option<String>,

    /// Extra Maven repositories (URL strings or `{ url, credentials }` objects)
    #[serde(default)]
    pub extra_maven_repos: Vec<serde_json::Value>,
}

/// The `apple` (or legacy `ios`) block of a module config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleConfig {
    #[serde(default)]
    pub modules: Vec<String>,

    #[serde(default)]
    pub podspec_path: Option<OneOrMany>,

    #[serde(default, alias = "swiftModuleNames")]
    pub swift_module_name: Option<OneOrMany>,

    #[serde(default)]
    pub app_delegate_subscribers: Vec<String>,

    #[serde(default)]
    pub react_delegate_handlers: Vec<String>,

    #[serde(default)]
    pub debug_only: bool,
}

/// A package's parsed module config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Supported platforms; all platforms when absent
    #[serde(default)]
    pub platforms: Option<Vec<String>>,

    #[serde(default)]
    pub core_features: BTreeSet<String>,

    #[serde(default)]
    pub android: Option<AndroidConfig>,

    #[serde(default)]
    pub apple: Option<AppleConfig>,

    #[serde(default)]
    pub ios: Option<AppleConfig>,
}

impl ModuleConfig {
    /// Parse and validate a module config from JSON text.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let config: ModuleConfig = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Load the module config of the package rooted at `package_dir`.
    ///
    /// Returns `Ok(None)` when the package has no config file.
    pub fn load(package_name: &str, package_dir: &Path) -> Result<Option<Self>, AutolinkError> {
        let Some(path) = Self::find(package_dir) else {
            return Ok(None);
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| AutolinkError::Io {
            path: path.clone(),
            source,
        })?;

        Self::parse(&contents)
            .map(Some)
            .map_err(|message| AutolinkError::InvalidModuleConfig {
                package: package_name.to_string(),
                path,
                message,
            })
    }

    /// Path of the config file inside `package_dir`, if one exists.
    pub fn find(package_dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| package_dir.join(name))
            .find(|path| match std::fs::metadata(path) {
                Ok(meta) => meta.is_file(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => false,
                Err(e) => {
                    tracing::warn!("cannot stat {}: {}", path.display(), e);
                    false
                }
            })
    }

    /// Whether the package opts into `platform`.
    pub fn supports_platform(&self, platform: Platform) -> bool {
        let Some(ref platforms) = self.platforms else {
            return true;
        };
        platforms.iter().any(|p| {
            p == platform.as_str() || (platform.is_apple() && p == APPLE_FAMILY)
        })
    }

    /// The Apple config block, preferring `apple` over the legacy `ios`.
    pub fn apple_config(&self) -> Option<&AppleConfig> {
        self.apple.as_ref().or(self.ios.as_ref())
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(ref platforms) = self.platforms {
            for p in platforms {
                if p != APPLE_FAMILY && p != "web" && p != "devtools" && p.parse::<Platform>().is_err() {
                    return Err(format!("unknown platform `{}` in `platforms`", p));
                }
            }
        }

        if let Some(ref android) = self.android {
            for plugin in &android.gradle_plugins {
                if plugin.id.trim().is_empty() {
                    return Err("gradle plugin with an empty `id`".to_string());
                }
                check_relative("gradlePlugins[].sourceDir", &plugin.source_dir)?;
            }
            for project in &android.projects {
                check_relative("projects[].path", &project.path)?;
                if matches!(project.name.as_deref(), Some(n) if n.trim().is_empty()) {
                    return Err(format!("project at `{}` has an empty `name`", project.path));
                }
            }
            if let Some(ref path) = android.path {
                check_relative("android.path", path)?;
            }
            let aar_names = android
                .gradle_aar_projects
                .iter()
                .chain(android.projects.iter().flat_map(|p| &p.gradle_aar_projects))
                .map(|aar| aar.name.as_str());
            for name in aar_names {
                if name.trim().is_empty() {
                    return Err("gradle AAR project with an empty `name`".to_string());
                }
            }
            check_class_names("android.modules", &android.modules)?;
            check_class_names("android.services", &android.services)?;
        }

        if let Some(apple) = self.apple_config() {
            check_class_names("apple.modules", &apple.modules)?;
        }

        Ok(())
    }
}

fn check_relative(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("`{}` must not be empty", field));
    }
    if Path::new(value).is_absolute() {
        return Err(format!(
            "`{}` must be relative to the package root, got `{}`",
            field, value
        ));
    }
    Ok(())
}

fn check_class_names(field: &str, names: &[String]) -> Result<(), String> {
    match names.iter().find(|n| n.trim().is_empty()) {
        Some(_) => Err(format!("`{}` contains an empty class name", field)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = ModuleConfig::parse(
            r#"{
                "platforms": ["apple", "android"],
                "coreFeatures": ["swiftui", "compose"],
                "android": {
                    "modules": ["expo.modules.foo.FooModule"],
                    "gradlePlugins": [
                        { "id": "expo-foo-plugin", "group": "expo.modules", "sourceDir": "plugin" }
                    ],
                    "publication": {
                        "groupId": "host.exp.exponent",
                        "artifactId": "expo.modules.foo",
                        "version": "1.0.0",
                        "repository": "local-maven-repo"
                    },
                    "extraMavenRepos": ["https://example.com/maven"]
                },
                "apple": {
                    "modules": ["FooModule"],
                    "podspecPath": "ios/ExpoFoo.podspec",
                    "debugOnly": true
                }
            }"#,
        )
        .unwrap();

        assert!(config.core_features.contains("compose"));
        let android = config.android.as_ref().unwrap();
        assert_eq!(android.modules, vec!["expo.modules.foo.FooModule"]);
        assert_eq!(android.gradle_plugins[0].apply_to_root_project, None);
        assert_eq!(android.publication.as_ref().unwrap().artifact_id, "expo.modules.foo");
        assert_eq!(android.extra_maven_repos.len(), 1);

        let apple = config.apple_config().unwrap();
        assert_eq!(
            apple.podspec_path.as_ref().unwrap().to_vec(),
            vec!["ios/ExpoFoo.podspec"]
        );
        assert!(apple.debug_only);
    }

    #[test]
    fn test_supports_platform() {
        let config = ModuleConfig::parse(r#"{ "platforms": ["apple"] }"#).unwrap();
        assert!(config.supports_platform(Platform::Ios));
        assert!(config.supports_platform(Platform::Macos));
        assert!(!config.supports_platform(Platform::Android));

        let config = ModuleConfig::parse("{}").unwrap();
        assert!(config.supports_platform(Platform::Android));
    }

    #[test]
    fn test_legacy_ios_block() {
        let config = ModuleConfig::parse(r#"{ "ios": { "modules": ["LegacyModule"] } }"#).unwrap();
        assert_eq!(config.apple_config().unwrap().modules, vec!["LegacyModule"]);
    }

    #[test]
    fn test_malformed_shapes_are_rejected() {
        assert!(ModuleConfig::parse(r#"{ "coreFeatures": "swiftui" }"#).is_err());
        assert!(ModuleConfig::parse(r#"{ "android": { "projects": [{ "name": "x" }] } }"#).is_err());
        assert!(ModuleConfig::parse(r#"{ "platforms": ["windows"] }"#).is_err());
        assert!(ModuleConfig::parse(r#"{ "android": { "path": "/abs/android" } }"#).is_err());
        assert!(ModuleConfig::parse(r#"{ "android": { "modules": [""] } }"#).is_err());
        assert!(ModuleConfig::parse("not json").is_err());
    }

    #[test]
    fn test_load_prefers_expo_module_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("unimodule.json"), r#"{ "platforms": ["ios"] }"#).unwrap();
        std::fs::write(
            tmp.path().join("expo-module.config.json"),
            r#"{ "platforms": ["android"] }"#,
        )
        .unwrap();

        let config = ModuleConfig::load("pkg", tmp.path()).unwrap().unwrap();
        assert_eq!(config.platforms, Some(vec!["android".to_string()]));
    }

    #[test]
    fn test_load_missing_and_invalid() {
        let tmp = TempDir::new().unwrap();
        assert!(ModuleConfig::load("pkg", tmp.path()).unwrap().is_none());

        std::fs::write(tmp.path().join("expo-module.config.json"), "{ oops").unwrap();
        let err = ModuleConfig::load("pkg", tmp.path()).unwrap_err();
        assert!(matches!(err, AutolinkError::InvalidModuleConfig { ref package, .. } if package == "pkg"));
    }
}
