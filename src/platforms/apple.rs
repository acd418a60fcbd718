//! Apple resolver (iOS, macOS, tvOS).
//!
//! Maps a package onto CocoaPods: the pods its podspecs define, the Swift
//! modules they build and the classes the generated modules provider has to
//! register.

use std::path::{Path, PathBuf};

use super::{linkable_config, PlatformResolver};
use crate::core::descriptor::{sorted_unique, AppleModule, ModuleDescriptor, PodDescriptor};
use crate::core::package::Package;
use crate::core::platform::Platform;
use crate::resolver::AutolinkError;
use crate::util::fs::glob_files;

/// Where podspecs are looked for when the config does not name them.
const PODSPEC_PATTERNS: [&str; 2] = ["*.podspec", "*/*.podspec"];

/// Swift module name CocoaPods derives from a pod name.
pub fn swift_module_name(pod_name: &str) -> String {
    pod_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Resolves packages for one Apple platform.
#[derive(Debug, Clone)]
pub struct AppleResolver {
    platform: Platform,
    flags: serde_json::Map<String, serde_json::Value>,
}

impl AppleResolver {
    /// Create a resolver for `platform`, passing `flags` through to every pod.
    pub fn new(platform: Platform, flags: serde_json::Map<String, serde_json::Value>) -> Self {
        AppleResolver { platform, flags }
    }

    fn podspecs(&self, package: &Package, configured: Option<Vec<String>>) -> Result<Vec<PathBuf>, AutolinkError> {
        match configured {
            Some(paths) => Ok(paths
                .iter()
                .map(|p| package.path().join(p))
                .filter(|p| {
                    let exists = p.is_file();
                    if !exists {
                        tracing::debug!("`{}` names missing podspec {}", package.name(), p.display());
                    }
                    exists
                })
                .collect()),
            None => glob_files(package.path(), &PODSPEC_PATTERNS).map_err(|e| AutolinkError::Io {
                path: package.path().to_path_buf(),
                source: std::io::Error::other(format!("{:#}", e)),
            }),
        }
    }
}

fn pod_descriptor(podspec: &Path) -> Option<PodDescriptor> {
    Some(PodDescriptor {
        pod_name: podspec.file_stem()?.to_string_lossy().into_owned(),
        podspec_dir: podspec.parent()?.to_path_buf(),
    })
}

impl PlatformResolver for AppleResolver {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn resolve_module(&self, package: &Package) -> Result<Option<ModuleDescriptor>, AutolinkError> {
        let Some(config) = linkable_config(package, self.platform) else {
            return Ok(None);
        };
        let apple = config.apple_config().cloned().unwrap_or_default();

        let podspecs = self.podspecs(package, apple.podspec_path.as_ref().map(|p| p.to_vec()))?;
        let pods: Vec<PodDescriptor> = podspecs.iter().filter_map(|p| pod_descriptor(p)).collect();
        if pods.is_empty() {
            tracing::debug!("`{}` has no podspec", package.name());
            return Ok(None);
        }

        let swift_module_names = match apple.swift_module_name {
            Some(names) => names.to_vec(),
            None => pods.iter().map(|pod| swift_module_name(&pod.pod_name)).collect(),
        };

        Ok(Some(ModuleDescriptor::Apple(AppleModule {
            package_name: package.name().to_string(),
            package_version: package.version().to_string(),
            pods,
            swift_module_names,
            modules: sorted_unique(apple.modules),
            app_delegate_subscribers: sorted_unique(apple.app_delegate_subscribers),
            react_delegate_handlers: sorted_unique(apple.react_delegate_handlers),
            debug_only: apple.debug_only,
            flags: self.flags.clone(),
            core_features: config.core_features.iter().cloned().collect(),
            build_from_source: false,
        })))
    }
}
