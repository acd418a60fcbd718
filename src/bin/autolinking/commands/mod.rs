//! Command implementations

pub mod autolink;
pub mod completions;
pub mod resolve;
pub mod search;
pub mod verify;

use anyhow::{Context, Result};

use autolinking::util::config::RawAutolinkingOptions;
use autolinking::{GlobalContext, Platform, Project};

use crate::cli::ProjectArgs;

/// Load the project for `platform`, with the command-line layer on top.
pub fn load_project(
    args: &ProjectArgs,
    platform: Platform,
    build_from_source: Option<Vec<String>>,
) -> Result<Project> {
    let ctx = GlobalContext::new()?;
    let root = ctx.project_root(args.project_root.as_deref())?;

    let overrides = RawAutolinkingOptions {
        build_from_source,
        ..args.overrides()
    };
    let project = Project::load(&root, platform, overrides)
        .with_context(|| format!("failed to load project at {}", root.display()))?;

    tracing::debug!("project root: {}", project.root().display());
    Ok(project)
}
