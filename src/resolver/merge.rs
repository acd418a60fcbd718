//! Merging per-package descriptors into one resolved graph.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;

use super::errors::{AutolinkError, AutolinkErrors};
use crate::core::descriptor::ModuleDescriptor;
use crate::core::platform::Platform;
use crate::util::hash::sha256_str;

/// Everything one platform needs to link, in deterministic order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGraph {
    pub platform: Platform,

    /// Extra Maven repositories, for Android
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_dependencies: Option<serde_json::Value>,

    /// Union of the core features every module requests, sorted
    pub core_features: Vec<String>,

    /// Module descriptors, sorted by package name
    pub modules: Vec<ModuleDescriptor>,
}

impl ResolvedGraph {
    /// Serialize as pretty JSON with a trailing newline.
    ///
    /// Fails when a path in the graph is not valid UTF-8.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// SHA-256 of the serialized graph; equal graphs give equal fingerprints.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        self.to_json().map(|json| sha256_str(&json))
    }

    /// Names of the linked packages, in graph order.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.package_name())
    }
}

/// Package name patterns selecting modules to build from source.
///
/// Each pattern is a regular expression matched against the whole package
/// name; a pattern that does not compile matches only itself.
#[derive(Debug, Clone, Default)]
pub struct BuildFromSource {
    patterns: Vec<Regex>,
}

impl BuildFromSource {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| {
                Regex::new(&format!("^(?:{})$", p))
                    .or_else(|e| {
                        tracing::warn!("treating build-from-source pattern `{}` literally: {}", p, e);
                        Regex::new(&format!("^{}$", regex::escape(p)))
                    })
                    .ok()
            })
            .collect();
        BuildFromSource { patterns }
    }

    pub fn matches(&self, package_name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(package_name))
    }
}

/// Where a build-system name was first claimed.
struct Claim {
    package: String,
    path: PathBuf,
}

/// Tracks names that must be unique across packages.
#[derive(Default)]
struct Claims {
    claims: BTreeMap<String, Claim>,
}

impl Claims {
    fn claim(&mut self, name: &str, package: &str, path: PathBuf, errors: &mut AutolinkErrors) {
        match self.claims.get(name) {
            Some(first) if first.package != package => {
                errors.push(AutolinkError::ProjectNameCollision {
                    project: name.to_string(),
                    first: first.package.clone(),
                    first_path: first.path.clone(),
                    second: package.to_string(),
                    second_path: path,
                });
            }
            Some(_) => {}
            None => {
                self.claims.insert(
                    name.to_string(),
                    Claim {
                        package: package.to_string(),
                        path,
                    },
                );
            }
        }
    }
}

/// Merge descriptors into a [`ResolvedGraph`].
///
/// Build-from-source overrides are applied first. Name collisions between
/// packages are all collected, overridden packages included. The extra
/// dependencies read from the app's native project win over the ones
/// packages declare.
pub fn merge_graph(
    platform: Platform,
    mut descriptors: Vec<ModuleDescriptor>,
    build_from_source: &BuildFromSource,
    extra_dependencies: Option<serde_json::Value>,
) -> Result<ResolvedGraph, AutolinkErrors> {
    descriptors.sort_by(|a, b| a.package_name().cmp(b.package_name()));

    let mut errors = AutolinkErrors::new();
    let mut claims = Claims::default();
    let mut core_features = BTreeSet::new();
    let mut package_repos: Vec<serde_json::Value> = Vec::new();

    for descriptor in &mut descriptors {
        let from_source = build_from_source.matches(descriptor.package_name());
        core_features.extend(descriptor.core_features().iter().cloned());

        match descriptor {
            ModuleDescriptor::Android(module) => {
                if from_source {
                    tracing::debug!("building `{}` from source", module.package_name);
                    for project in &mut module.projects {
                        project.publication = None;
                    }
                }
                for project in &module.projects {
                    claims.claim(&project.name, &module.package_name, project.source_dir.clone(), &mut errors);
                    for aar in &project.aar_projects {
                        claims.claim(&aar.name, &module.package_name, aar.project_dir.clone(), &mut errors);
                    }
                }
                for repo in &module.extra_maven_repos {
                    if !package_repos.contains(repo) {
                        package_repos.push(repo.clone());
                    }
                }
            }
            ModuleDescriptor::Apple(module) => {
                if from_source {
                    tracing::debug!("building `{}` from source", module.package_name);
                    module.build_from_source = true;
                }
                for pod in &module.pods {
                    claims.claim(&pod.pod_name, &module.package_name, pod.podspec_dir.clone(), &mut errors);
                }
            }
        }
    }

    let extra_dependencies = extra_dependencies.or_else(|| {
        (!package_repos.is_empty()).then(|| serde_json::Value::Array(package_repos))
    });

    errors.into_result(ResolvedGraph {
        platform,
        extra_dependencies,
        core_features: core_features.into_iter().collect(),
        modules: descriptors,
    })
}
