//! Resolve a project and emit its native build configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::project::Project;
use crate::discovery::collect_packages;
use crate::emit::{emit, EmitOptions, EmitOutcome};
use crate::platforms::resolver_for;
use crate::resolver::{merge_graph, resolve_modules, BuildFromSource, ResolvedGraph};
use crate::util::shell::Progress;

/// Where artifacts go when no target is given, relative to the native root.
pub const DEFAULT_TARGET_DIR: &str = "build/generated/autolinking";

/// Options for [`autolink`].
#[derive(Debug, Clone, Default)]
pub struct AutolinkOptions {
    /// Worker count for per-package resolution; defaults to the CPU count
    pub jobs: Option<usize>,

    /// Output directory; defaults to [`default_target_dir`]
    pub target_dir: Option<PathBuf>,

    pub emit: EmitOptions,
}

/// Result of a successful [`autolink`] run.
#[derive(Debug)]
pub struct AutolinkResult {
    pub graph: ResolvedGraph,
    pub target_dir: PathBuf,
    pub outcome: EmitOutcome,
}

/// Default output directory for `project`.
pub fn default_target_dir(project: &Project) -> PathBuf {
    project.native_root().join(DEFAULT_TARGET_DIR)
}

/// Discover, resolve and merge the modules of `project`.
///
/// Every phase runs on whatever the previous one produced, so a package
/// that fails to load or resolve does not hide errors in the others. All
/// configuration errors come back together as [`crate::AutolinkErrors`] inside the
/// `anyhow` error so callers can report each one. `progress` advances once
/// per discovered package as workers finish.
pub fn resolve_graph(project: &Project, jobs: Option<usize>, progress: &Progress) -> Result<ResolvedGraph> {
    let platform = project.platform();
    let options = project.options();

    let (packages, mut errors) = collect_packages(project);
    tracing::debug!("found {} packages for {}", packages.len(), platform);
    progress.set_length(packages.len() as u64);

    let resolver = resolver_for(platform, options);
    let (descriptors, resolve_errors) =
        resolve_modules(packages.packages(), resolver.as_ref(), jobs, |_| progress.inc(1));
    errors.extend(resolve_errors);
    let extra_dependencies = resolver.resolve_extra_build_dependencies(&project.native_root());

    let merged = merge_graph(
        platform,
        descriptors,
        &BuildFromSource::new(&options.build_from_source),
        extra_dependencies,
    );
    let graph = match merged {
        Ok(graph) => errors.into_result(graph)?,
        Err(merge_errors) => {
            errors.extend(merge_errors);
            return Err(errors.into());
        }
    };

    tracing::info!("linked {} of {} packages for {}", graph.modules.len(), packages.len(), platform);
    Ok(graph)
}

/// Resolve `project` and write its artifacts.
pub fn autolink(project: &Project, opts: &AutolinkOptions, progress: &Progress) -> Result<AutolinkResult> {
    let graph = resolve_graph(project, opts.jobs, progress)?;

    let target_dir = opts
        .target_dir
        .as_ref()
        .map(|dir| project.root().join(dir))
        .unwrap_or_else(|| default_target_dir(project));

    let outcome = emit(&graph, &target_dir, &opts.emit)
        .with_context(|| format!("failed to write autolinking files to {}", target_dir.display()))?;

    Ok(AutolinkResult {
        graph,
        target_dir,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::Platform;
    use crate::resolver::{AutolinkError, AutolinkErrors};
    use crate::test_support::{kotlin_package_source, ProjectFixture};
    use crate::util::config::RawAutolinkingOptions;

    fn two_package_fixture() -> ProjectFixture {
        let fixture = ProjectFixture::new(&["expo-a", "expo-b"]);
        for (name, class) in [("expo-a", "APackage"), ("expo-b", "BPackage")] {
            fixture.add_package(name, "1.0.0", Some("{}"));
            fixture.write(&format!("node_modules/{}/android/build.gradle", name), "");
            fixture.write(
                &format!("node_modules/{}/android/src/main/java/{}.kt", name, class),
                &kotlin_package_source(&format!("expo.modules.{}", &name[5..]), class),
            );
        }
        fixture
    }

    #[test]
    fn test_two_package_end_to_end() {
        let fixture = two_package_fixture();
        let project = fixture.project(Platform::Android, RawAutolinkingOptions::default());

        let result = autolink(&project, &AutolinkOptions::default(), &Progress::hidden()).unwrap();
        assert_eq!(result.target_dir, fixture.root().join("android/build/generated/autolinking"));
        assert_eq!(result.outcome.written.len(), 3);

        let java = std::fs::read_to_string(result.target_dir.join("ExpoModulesPackageList.java")).unwrap();
        let a = java.find("new expo.modules.a.APackage()").unwrap();
        let b = java.find("new expo.modules.b.BPackage()").unwrap();
        assert!(a < b);

        let settings = std::fs::read_to_string(result.target_dir.join("settings.autolinking.gradle")).unwrap();
        assert!(settings.contains("include(':expo-a')"));
        assert!(settings.contains("include(':expo-b')"));
    }

    #[test]
    fn test_package_without_native_code_is_left_out() {
        let fixture = ProjectFixture::new(&["pkg-a", "pkg-b"]);
        fixture.add_package(
            "pkg-a",
            "1.0.0",
            Some(r#"{ "android": { "projects": [{ "path": "android", "modules": ["com.a.FooModule"] }] } }"#),
        );
        fixture.write("node_modules/pkg-a/android/build.gradle", "");
        fixture.add_package("pkg-b", "1.0.0", None);
        let project = fixture.project(Platform::Android, RawAutolinkingOptions::default());

        let graph = resolve_graph(&project, None, &Progress::hidden()).unwrap();
        assert_eq!(graph.modules.len(), 1);
        assert_eq!(graph.package_names().collect::<Vec<_>>(), vec!["pkg-a"]);

        let module = graph.modules[0].as_android().unwrap();
        assert_eq!(module.projects.len(), 1);
        assert_eq!(module.projects[0].name, "pkg-a");
        assert_eq!(module.projects[0].modules, vec!["com.a.FooModule"]);
    }

    #[test]
    fn test_errors_from_every_phase_are_reported_together() {
        let fixture = ProjectFixture::new(&["broken", "expo-a", "expo-b", "expo-c"]);
        fixture.add_package("broken", "1.0.0", Some("{ nope"));
        for name in ["expo-a", "expo-b"] {
            fixture.add_package(
                name,
                "1.0.0",
                Some(r#"{ "android": { "projects": [{ "name": "shared", "path": "android" }] } }"#),
            );
            fixture.write(&format!("node_modules/{}/android/build.gradle", name), "");
        }
        fixture.add_package(
            "expo-c",
            "1.0.0",
            Some(r#"{ "android": { "projects": [{ "name": "missing", "path": "missing" }] } }"#),
        );
        let project = fixture.project(Platform::Android, RawAutolinkingOptions::default());

        let err = resolve_graph(&project, None, &Progress::hidden()).unwrap_err();
        let errors = err.downcast_ref::<AutolinkErrors>().unwrap();
        assert_eq!(errors.len(), 3);

        let mut kinds = [false; 3];
        for error in errors.iter() {
            match error {
                AutolinkError::InvalidModuleConfig { package, .. } => {
                    assert_eq!(package, "broken");
                    kinds[0] = true;
                }
                AutolinkError::MissingBuildFile { package, .. } => {
                    assert_eq!(package, "expo-c");
                    kinds[1] = true;
                }
                AutolinkError::ProjectNameCollision { first, second, .. } => {
                    assert_eq!((first.as_str(), second.as_str()), ("expo-a", "expo-b"));
                    kinds[2] = true;
                }
                other => panic!("unexpected error: {}", other),
            }
        }
        assert_eq!(kinds, [true; 3]);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let fixture = two_package_fixture();
        let project = fixture.project(Platform::Android, RawAutolinkingOptions::default());

        let first = autolink(&project, &AutolinkOptions::default(), &Progress::hidden()).unwrap();
        let json = std::fs::read(first.target_dir.join("autolinking.json")).unwrap();
        let second = autolink(&project, &AutolinkOptions::default(), &Progress::hidden()).unwrap();

        assert_eq!(first.graph.fingerprint().unwrap(), second.graph.fingerprint().unwrap());
        assert!(second.outcome.written.is_empty());
        assert_eq!(std::fs::read(second.target_dir.join("autolinking.json")).unwrap(), json);
    }

    #[test]
    fn test_collision_reports_both_packages() {
        let fixture = ProjectFixture::new(&["expo-a", "expo-b"]);
        for name in ["expo-a", "expo-b"] {
            fixture.add_package(
                name,
                "1.0.0",
                Some(r#"{ "android": { "projects": [{ "name": "shared", "path": "android" }] } }"#),
            );
            fixture.write(&format!("node_modules/{}/android/build.gradle", name), "");
        }
        let project = fixture.project(Platform::Android, RawAutolinkingOptions::default());

        let err = autolink(&project, &AutolinkOptions::default(), &Progress::hidden()).unwrap_err();
        let errors = err.downcast_ref::<AutolinkErrors>().unwrap();
        assert_eq!(errors.len(), 1);
        let message = errors.to_string();
        assert!(message.contains("expo-a") && message.contains("expo-b"));
        assert!(!fixture.root().join("android/build/generated/autolinking").exists());
    }

    #[test]
    fn test_custom_target_and_namespace() {
        let fixture = two_package_fixture();
        let project = fixture.project(Platform::Android, RawAutolinkingOptions::default());
        let opts = AutolinkOptions {
            target_dir: Some(PathBuf::from("out")),
            emit: EmitOptions {
                namespace: "com.example".to_string(),
            },
            ..Default::default()
        };

        let result = autolink(&project, &opts, &Progress::hidden()).unwrap();
        assert_eq!(result.target_dir, fixture.root().join("out"));
        let java = std::fs::read_to_string(fixture.root().join("out/ExpoModulesPackageList.java")).unwrap();
        assert!(java.contains("package com.example;"));
    }
}
