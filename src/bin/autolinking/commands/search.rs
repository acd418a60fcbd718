//! `autolinking search` command

use anyhow::Result;
use serde::Serialize;

use autolinking::discovery::find_packages;
use autolinking::util::config::describe;
use autolinking::util::shell::Shell;

use crate::cli::SearchArgs;
use crate::commands::load_project;

/// One search result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageResult<'a> {
    name: &'a str,
    version: &'a str,
    path: String,
    has_module_config: bool,
}

pub fn execute(args: SearchArgs, shell: &Shell) -> Result<()> {
    let project = load_project(&args.project, args.platform, None)?;

    if shell.is_verbose() {
        for (key, value) in describe(project.options()) {
            tracing::debug!("{} = {}", key, value);
        }
    }

    let results = find_packages(&project)?;
    let packages: Vec<PackageResult> = results
        .packages()
        .iter()
        .map(|p| PackageResult {
            name: p.name(),
            version: p.version(),
            path: p.path().display().to_string(),
            has_module_config: p.has_module_config(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    if packages.is_empty() {
        println!("No packages found");
        return Ok(());
    }

    println!(
        "Found {} package{}:\n",
        packages.len(),
        if packages.len() == 1 { "" } else { "s" }
    );
    for package in &packages {
        let marker = if package.has_module_config { " [native]" } else { "" };
        println!("  {}@{}{}", package.name, package.version, marker);
        println!("      {}", package.path);
    }

    for (name, revisions) in results.duplicates() {
        shell.warn(format!("`{}` is installed {} more time(s)", name, revisions.len()));
    }
    Ok(())
}
