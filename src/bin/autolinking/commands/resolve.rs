//! `autolinking resolve` command

use anyhow::Result;

use autolinking::core::ModuleDescriptor;
use autolinking::ops::resolve_graph;
use autolinking::util::shell::{Shell, Status};

use crate::cli::ResolveArgs;
use crate::commands::load_project;

pub fn execute(args: ResolveArgs, shell: &Shell) -> Result<()> {
    let project = load_project(&args.project, args.platform, args.build_from_source)?;

    let progress = shell.progress("resolving");
    let graph = resolve_graph(&project, args.jobs, &progress);
    progress.finish();
    let graph = graph?;

    if args.json {
        print!("{}", graph.to_json()?);
        return Ok(());
    }

    if graph.modules.is_empty() {
        shell.note(format!("no native modules found for {}", graph.platform));
    }
    for module in &graph.modules {
        match module {
            ModuleDescriptor::Android(m) => {
                println!("{}@{}", m.package_name, m.package_version);
                for project in &m.projects {
                    println!("  project :{} ({})", project.name, project.source_dir.display());
                    for class in project.modules.iter().chain(&project.packages) {
                        println!("    {}", class);
                    }
                }
                for plugin in &m.plugins {
                    println!("  plugin {} ({})", plugin.id, plugin.source_dir.display());
                }
            }
            ModuleDescriptor::Apple(m) => {
                let suffix = if m.debug_only { " [debug only]" } else { "" };
                println!("{}@{}{}", m.package_name, m.package_version, suffix);
                for pod in &m.pods {
                    println!("  pod {} ({})", pod.pod_name, pod.podspec_dir.display());
                }
                for class in &m.modules {
                    println!("    {}", class);
                }
            }
        }
    }

    if !graph.core_features.is_empty() {
        println!("\ncore features: {}", graph.core_features.join(", "));
    }
    if let Some(ref extra) = graph.extra_dependencies {
        println!("extra dependencies: {}", extra);
    }

    shell.status(Status::Finished, format!("fingerprint {}", graph.fingerprint()?));
    Ok(())
}
