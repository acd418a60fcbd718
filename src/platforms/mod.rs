//! Per-platform module resolvers.
//!
//! A resolver turns one discovered package into the descriptor its platform's
//! build system needs, or `None` when the package has nothing to link there.
//! Resolvers only read the filesystem and are shared across worker threads.

pub mod android;
pub mod apple;

use std::path::Path;

use crate::core::descriptor::ModuleDescriptor;
use crate::core::module_config::ModuleConfig;
use crate::core::package::Package;
use crate::core::platform::Platform;
use crate::resolver::AutolinkError;
use crate::util::config::AutolinkingOptions;

pub use android::AndroidResolver;
pub use apple::AppleResolver;

/// Legacy packages that used to be linked by an older mechanism and must
/// never be linked again.
pub const DENYLISTED_PACKAGES: [&str; 3] = [
    "@unimodules/react-native-adapter",
    "@unimodules/core",
    "react-native-unimodules",
];

/// Resolves packages for one platform.
pub trait PlatformResolver: Send + Sync {
    /// Platform this resolver produces descriptors for.
    fn platform(&self) -> Platform;

    /// Resolve one package, or `Ok(None)` if it has nothing to link.
    fn resolve_module(&self, package: &Package) -> Result<Option<ModuleDescriptor>, AutolinkError>;

    /// Graph-level extra build dependencies read from the app's native project.
    fn resolve_extra_build_dependencies(&self, _native_root: &Path) -> Option<serde_json::Value> {
        None
    }
}

/// Get the resolver for `platform`.
pub fn resolver_for(platform: Platform, options: &AutolinkingOptions) -> Box<dyn PlatformResolver> {
    match platform {
        Platform::Android => Box::new(AndroidResolver::new()),
        Platform::Ios | Platform::Macos | Platform::Tvos => {
            Box::new(AppleResolver::new(platform, options.flags.clone()))
        }
    }
}

/// The package's module config, if the package should be linked on `platform`.
fn linkable_config(package: &Package, platform: Platform) -> Option<&ModuleConfig> {
    if DENYLISTED_PACKAGES.contains(&package.name()) {
        tracing::debug!("skipping denylisted package `{}`", package.name());
        return None;
    }
    let config = package.module_config()?;
    if !config.supports_platform(platform) {
        tracing::debug!("`{}` does not support {}", package.name(), platform);
        return None;
    }
    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn package(name: &str, config: Option<&str>) -> Package {
        Package::new(
            name,
            "1.0.0",
            PathBuf::from("/nonexistent").join(name),
            config.map(|c| ModuleConfig::parse(c).unwrap()),
        )
    }

    #[test]
    fn test_linkable_config() {
        assert!(linkable_config(&package("expo-foo", Some("{}")), Platform::Android).is_some());
        assert!(linkable_config(&package("expo-foo", None), Platform::Android).is_none());
        assert!(linkable_config(&package("@unimodules/core", Some("{}")), Platform::Ios).is_none());

        let apple_only = package("expo-foo", Some(r#"{ "platforms": ["apple"] }"#));
        assert!(linkable_config(&apple_only, Platform::Macos).is_some());
        assert!(linkable_config(&apple_only, Platform::Android).is_none());
    }

    #[test]
    fn test_resolver_for() {
        let options = AutolinkingOptions::defaults(Path::new("/app"));
        for platform in Platform::ALL {
            assert_eq!(resolver_for(platform, &options).platform(), platform);
        }
    }
}
