//! Per-platform module descriptors produced by the resolvers.
//!
//! Descriptors serialize with camelCase keys in field order; together with
//! the sorted lists inside them this makes emitted JSON byte-stable.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::module_config::Publication;

/// A Gradle plugin contributed by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradlePlugin {
    pub id: String,
    pub group: String,
    pub source_dir: PathBuf,
    pub apply_to_root_project: bool,
}

/// A prebuilt AAR wrapped in a generated Gradle project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AarProject {
    pub name: String,
    pub aar_file_path: PathBuf,
    pub project_dir: PathBuf,
}

/// One Gradle sub-project contributed by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// Build-system-safe project name
    pub name: String,

    /// Absolute project directory
    pub source_dir: PathBuf,

    /// Module classes, sorted
    pub modules: Vec<String>,

    /// Service classes, sorted
    pub services: Vec<String>,

    /// Legacy package classes found by scanning sources, sorted
    pub packages: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<Publication>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aar_projects: Vec<AarProject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_use_publication_script_path: Option<PathBuf>,
}

/// Android resolution result for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidModule {
    pub package_name: String,
    pub package_version: String,
    pub projects: Vec<ProjectDescriptor>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<GradlePlugin>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub core_features: Vec<String>,

    /// Repositories declared in the module config; folded into the graph-level value
    #[serde(skip)]
    pub extra_maven_repos: Vec<serde_json::Value>,
}

/// A CocoaPods pod contributed by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodDescriptor {
    pub pod_name: String,
    pub podspec_dir: PathBuf,
}

/// Apple resolution result for one package.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleModule {
    pub package_name: String,
    pub package_version: String,
    pub pods: Vec<PodDescriptor>,
    pub swift_module_names: Vec<String>,
    pub modules: Vec<String>,
    pub app_delegate_subscribers: Vec<String>,
    pub react_delegate_handlers: Vec<String>,
    pub debug_only: bool,

    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub flags: serde_json::Map<String, serde_json::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub core_features: Vec<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub build_from_source: bool,
}

/// Resolution result for one package on one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModuleDescriptor {
    Android(AndroidModule),
    Apple(AppleModule),
}

impl ModuleDescriptor {
    /// Name of the package this descriptor came from.
    pub fn package_name(&self) -> &str {
        match self {
            ModuleDescriptor::Android(m) => &m.package_name,
            ModuleDescriptor::Apple(m) => &m.package_name,
        }
    }

    /// Core features the package requests.
    pub fn core_features(&self) -> &[String] {
        match self {
            ModuleDescriptor::Android(m) => &m.core_features,
            ModuleDescriptor::Apple(m) => &m.core_features,
        }
    }

    /// Get the Android descriptor, if this is one.
    pub fn as_android(&self) -> Option<&AndroidModule> {
        match self {
            ModuleDescriptor::Android(m) => Some(m),
            ModuleDescriptor::Apple(_) => None,
        }
    }

    /// Get the Apple descriptor, if this is one.
    pub fn as_apple(&self) -> Option<&AppleModule> {
        match self {
            ModuleDescriptor::Apple(m) => Some(m),
            ModuleDescriptor::Android(_) => None,
        }
    }
}

/// Sort and deduplicate a list of class names.
pub fn sorted_unique(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}
