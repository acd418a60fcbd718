//! Configuration emitter.
//!
//! Renders a [`ResolvedGraph`] into the files a platform's native build
//! consumes and writes them all-or-nothing. Every file is first staged as a
//! temp file next to its destination; only when all are staged are they
//! moved into place, and a failed move restores the files already replaced.

pub mod android;
pub mod apple;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::core::platform::Platform;
use crate::resolver::ResolvedGraph;
use crate::util::fs::ensure_dir;

/// JSON dump of the resolved graph, written for every platform.
pub const GRAPH_FILE: &str = "autolinking.json";

/// Default Java package of the generated package list.
pub const DEFAULT_NAMESPACE: &str = "expo.modules";

/// Options controlling what gets rendered.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Java package of `ExpoModulesPackageList`
    pub namespace: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the target directory
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Artifact {
            path: path.into(),
            contents,
        }
    }
}

/// Files written by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOutcome {
    /// Files whose contents changed
    pub written: Vec<PathBuf>,

    /// Files left alone because they already held the same contents
    pub unchanged: Vec<PathBuf>,
}

/// The full set of files for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Look up an artifact by its relative path.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.path == path.as_ref())
    }

    /// Write every artifact under `target_dir`, all or nothing.
    pub fn write(&self, target_dir: &Path) -> Result<EmitOutcome> {
        ensure_dir(target_dir)?;

        let mut outcome = EmitOutcome::default();
        let mut staged: Vec<(PathBuf, NamedTempFile)> = Vec::new();

        for artifact in &self.artifacts {
            let dest = target_dir.join(&artifact.path);
            if matches!(std::fs::read(&dest), Ok(existing) if existing == artifact.contents.as_bytes()) {
                tracing::debug!("{} is up to date", dest.display());
                outcome.unchanged.push(dest);
                continue;
            }

            let parent = dest.parent().unwrap_or(target_dir);
            ensure_dir(parent)?;
            let mut tmp = NamedTempFile::new_in(parent)
                .with_context(|| format!("failed to stage {}", dest.display()))?;
            tmp.write_all(artifact.contents.as_bytes())
                .and_then(|_| tmp.flush())
                .with_context(|| format!("failed to stage {}", dest.display()))?;
            staged.push((dest, tmp));
        }

        let mut committed: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::new();
        for (dest, tmp) in staged {
            let backup = std::fs::read(&dest).ok();
            if let Err(e) = tmp.persist(&dest) {
                rollback(&committed);
                return Err(e.error).with_context(|| format!("failed to write {}", dest.display()));
            }
            tracing::debug!("wrote {}", dest.display());
            committed.push((dest, backup));
        }

        outcome.written = committed.into_iter().map(|(dest, _)| dest).collect();
        Ok(outcome)
    }
}

/// Put back what was at each committed destination before this run.
fn rollback(committed: &[(PathBuf, Option<Vec<u8>>)]) {
    for (dest, backup) in committed.iter().rev() {
        let restored = match backup {
            Some(contents) => std::fs::write(dest, contents),
            None => std::fs::remove_file(dest),
        };
        if let Err(e) = restored {
            tracing::warn!("failed to restore {}: {}", dest.display(), e);
        }
    }
}

/// Render the artifacts for `graph`'s platform.
///
/// Fails without producing anything when the graph cannot be serialized.
pub fn render(graph: &ResolvedGraph, options: &EmitOptions) -> Result<ArtifactSet> {
    let json = graph.to_json().context("failed to serialize the resolved graph")?;

    let mut set = ArtifactSet::new();
    match graph.platform {
        Platform::Android => {
            set.push(Artifact::new(
                android::PACKAGE_LIST_FILE,
                android::render_package_list(graph, &options.namespace),
            ));
            set.push(Artifact::new(android::SETTINGS_FILE, android::render_settings(graph)));
        }
        Platform::Ios | Platform::Macos | Platform::Tvos => {
            set.push(Artifact::new(apple::PROVIDER_FILE, apple::render_provider(graph)));
        }
    }
    set.push(Artifact::new(GRAPH_FILE, json));
    Ok(set)
}

/// Render and write the artifacts for `graph` into `target_dir`.
pub fn emit(graph: &ResolvedGraph, target_dir: &Path, options: &EmitOptions) -> Result<EmitOutcome> {
    render(graph, options)?.write(target_dir)
}
