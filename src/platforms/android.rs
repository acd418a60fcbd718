//! Android resolver.
//!
//! Maps a package onto Gradle: sub-projects to `include`, the module and
//! service classes they contribute, legacy package classes found by scanning
//! their sources, Gradle plugins and prebuilt AAR projects.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use glob::Pattern;
use regex::Regex;

use super::{linkable_config, PlatformResolver};
use crate::core::descriptor::{
    sorted_unique, AarProject, AndroidModule, GradlePlugin, ModuleDescriptor, ProjectDescriptor,
};
use crate::core::module_config::{AarProjectConfig, AndroidConfig, AndroidProjectConfig};
use crate::core::package::Package;
use crate::core::platform::Platform;
use crate::resolver::AutolinkError;
use crate::util::fs::{compile_patterns, scan_files_recursively};
use crate::util::properties::read_property;

/// Properties file of the app's Android project.
pub const ANDROID_PROPERTIES_FILE: &str = "gradle.properties";

/// Key holding extra Maven repositories as a JSON array.
pub const ANDROID_EXTRA_BUILD_DEPS_KEY: &str = "android.extraMavenRepos";

/// Default project directory inside a package.
const DEFAULT_PROJECT_DIR: &str = "android";

const BUILD_FILES: [&str; 2] = ["build.gradle", "build.gradle.kts"];

/// Source file name endings that may hold a package class.
const SOURCE_SUFFIXES: [&str; 4] = ["Package.kt", "Package.java", "Module.kt", "Module.java"];

/// Pruned while scanning a project; `build` is the project's own Gradle output.
static SCAN_IGNORE: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    compile_patterns(&["build", "**/.gradle", "**/.cxx"]).unwrap_or_default()
});

static MARKER_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bimport\s+(?:expo\.modules\.core|org\.unimodules\.core)\.(?:BasePackage|interfaces\.Package)\b",
    )
    .expect("marker import regex is valid")
});

static PACKAGE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*package\s+([\w.]+)").expect("package regex is valid"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("non-word regex is valid"));

/// Gradle project name for a package: `@expo/example` -> `expo-example`.
pub fn convert_package_to_project_name(package_name: &str) -> String {
    let name = package_name.strip_prefix('@').unwrap_or(package_name);
    NON_WORD.replace_all(name, "-").into_owned()
}

/// Gradle project name for a sub-project at `project_path` inside a package.
///
/// The project in `android` keeps the plain package name; any other is
/// suffixed with its path, `/` replaced by `-`.
pub fn convert_package_with_gradle_to_project_name(package_name: &str, project_path: &str) -> String {
    let base = convert_package_to_project_name(package_name);
    let path = normalize_project_path(project_path);
    if path == DEFAULT_PROJECT_DIR {
        base
    } else {
        format!("{}${}", base, path.replace('/', "-"))
    }
}

/// Read extra Maven repositories from the app's `gradle.properties`.
///
/// Missing file, missing key and malformed JSON all yield `None`.
pub fn resolve_extra_build_dependencies(android_root: &Path) -> Option<serde_json::Value> {
    let path = android_root.join(ANDROID_PROPERTIES_FILE);
    let raw = match read_property(&path, ANDROID_EXTRA_BUILD_DEPS_KEY) {
        Ok(value) => value?,
        Err(e) => {
            tracing::warn!("{:#}", e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("ignoring malformed `{}`: {}", ANDROID_EXTRA_BUILD_DEPS_KEY, e);
            None
        }
    }
}

fn normalize_project_path(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.trim_end_matches('/')
}

fn has_build_file(dir: &Path) -> bool {
    BUILD_FILES.iter().any(|f| dir.join(f).is_file())
}

/// Fully qualified names of package classes under `dir`.
///
/// A source file counts when its name has one of the known suffixes and it
/// imports one of the package marker interfaces.
fn scan_package_classes(dir: &Path) -> Vec<String> {
    let classes = scan_files_recursively(dir, &SCAN_IGNORE)
        .filter(|entry| SOURCE_SUFFIXES.iter().any(|s| entry.name.ends_with(s)))
        .filter_map(|entry| {
            let contents = match std::fs::read_to_string(&entry.path) {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::debug!("skipping {}: {}", entry.path.display(), e);
                    return None;
                }
            };
            if !MARKER_IMPORT.is_match(&contents) {
                return None;
            }
            let package = PACKAGE_DECL.captures(&contents)?.get(1)?.as_str().to_string();
            let class = entry.path.file_stem()?.to_string_lossy().into_owned();
            Some(format!("{}.{}", package, class))
        })
        .collect();
    sorted_unique(classes)
}

/// Resolves packages for Android.
#[derive(Debug, Default, Clone, Copy)]
pub struct AndroidResolver;

impl AndroidResolver {
    pub fn new() -> Self {
        AndroidResolver
    }

    fn resolve_projects(
        &self,
        package: &Package,
        config: &AndroidConfig,
    ) -> Result<Vec<ProjectDescriptor>, AutolinkError> {
        let default_name = convert_package_to_project_name(package.name());
        let default_dir = config
            .path
            .as_deref()
            .map(normalize_project_path)
            .unwrap_or(DEFAULT_PROJECT_DIR);

        if config.projects.is_empty() {
            let source_dir = package.path().join(default_dir);
            if !has_build_file(&source_dir) {
                tracing::debug!("`{}` has no Android project at {}", package.name(), source_dir.display());
                return Ok(Vec::new());
            }
            let declared = AndroidProjectConfig {
                name: None,
                path: default_dir.to_string(),
                modules: config.modules.clone(),
                services: config.services.clone(),
                publication: config.publication.clone(),
                gradle_aar_projects: config.gradle_aar_projects.clone(),
                should_use_publication_script_path: config.should_use_publication_script_path.clone(),
            };
            return Ok(vec![self.project(package, &default_name, default_name.clone(), &declared, source_dir)]);
        }

        let mut names = BTreeSet::new();
        let mut projects = Vec::with_capacity(config.projects.len());
        for declared in &config.projects {
            let path = normalize_project_path(&declared.path);
            let name = declared
                .name
                .clone()
                .unwrap_or_else(|| convert_package_with_gradle_to_project_name(package.name(), path));
            let source_dir = package.path().join(path);

            if !has_build_file(&source_dir) {
                return Err(AutolinkError::MissingBuildFile {
                    package: package.name().to_string(),
                    project: name,
                    path: source_dir,
                });
            }
            if !names.insert(name.clone()) {
                return Err(AutolinkError::DuplicateProjectName {
                    package: package.name().to_string(),
                    project: name,
                    path: source_dir,
                });
            }

            let inherited = (path == default_dir).then(|| inherit_defaults(declared, config));
            let declared = inherited.as_ref().unwrap_or(declared);
            projects.push(self.project(package, &default_name, name, declared, source_dir));
        }
        Ok(projects)
    }

    fn project(
        &self,
        package: &Package,
        default_name: &str,
        name: String,
        declared: &AndroidProjectConfig,
        source_dir: PathBuf,
    ) -> ProjectDescriptor {
        ProjectDescriptor {
            modules: sorted_unique(declared.modules.clone()),
            services: sorted_unique(declared.services.clone()),
            packages: scan_package_classes(&source_dir),
            publication: declared.publication.clone(),
            aar_projects: aar_projects(default_name, &declared.gradle_aar_projects, package, &source_dir),
            should_use_publication_script_path: declared
                .should_use_publication_script_path
                .as_ref()
                .map(|p| package.path().join(p)),
            source_dir,
            name,
        }
    }
}

/// A declared project in the default directory picks up the top-level lists
/// it leaves empty.
fn inherit_defaults(declared: &AndroidProjectConfig, config: &AndroidConfig) -> AndroidProjectConfig {
    let mut project = declared.clone();
    if project.modules.is_empty() {
        project.modules = config.modules.clone();
    }
    if project.services.is_empty() {
        project.services = config.services.clone();
    }
    if project.publication.is_none() {
        project.publication = config.publication.clone();
    }
    if project.gradle_aar_projects.is_empty() {
        project.gradle_aar_projects = config.gradle_aar_projects.clone();
    }
    if project.should_use_publication_script_path.is_none() {
        project.should_use_publication_script_path = config.should_use_publication_script_path.clone();
    }
    project
}

fn aar_projects(
    default_name: &str,
    configs: &[AarProjectConfig],
    package: &Package,
    project_dir: &Path,
) -> Vec<AarProject> {
    configs
        .iter()
        .map(|aar| AarProject {
            name: format!("{}${}", default_name, aar.name),
            aar_file_path: package.path().join(&aar.aar_file_path),
            project_dir: project_dir.join("build").join(&aar.name),
        })
        .collect()
}

impl PlatformResolver for AndroidResolver {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    fn resolve_module(&self, package: &Package) -> Result<Option<ModuleDescriptor>, AutolinkError> {
        let Some(config) = linkable_config(package, Platform::Android) else {
            return Ok(None);
        };
        let android = config.android.clone().unwrap_or_default();

        let plugins: Vec<GradlePlugin> = android
            .gradle_plugins
            .iter()
            .map(|plugin| GradlePlugin {
                id: plugin.id.clone(),
                group: plugin.group.clone(),
                source_dir: package.path().join(&plugin.source_dir),
                apply_to_root_project: plugin.apply_to_root_project.unwrap_or(true),
            })
            .collect();

        let projects = self.resolve_projects(package, &android)?;
        if projects.is_empty() && plugins.is_empty() {
            tracing::debug!("`{}` has nothing to link on Android", package.name());
            return Ok(None);
        }

        Ok(Some(ModuleDescriptor::Android(AndroidModule {
            package_name: package.name().to_string(),
            package_version: package.version().to_string(),
            projects,
            plugins,
            core_features: config.core_features.iter().cloned().collect(),
            extra_maven_repos: android.extra_maven_repos,
        })))
    }

    fn resolve_extra_build_dependencies(&self, native_root: &Path) -> Option<serde_json::Value> {
        resolve_extra_build_dependencies(native_root)
    }
}
