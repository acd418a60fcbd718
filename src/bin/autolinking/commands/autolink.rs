//! `autolinking autolink` command

use anyhow::Result;

use autolinking::emit::EmitOptions;
use autolinking::ops::{autolink, AutolinkOptions};
use autolinking::util::shell::{Shell, Status};

use crate::cli::AutolinkArgs;
use crate::commands::load_project;

pub fn execute(args: AutolinkArgs, shell: &Shell) -> Result<()> {
    let project = load_project(&args.project, args.platform, args.build_from_source)?;

    shell.status(
        Status::Resolving,
        format!("native modules for {}", project.platform()),
    );

    let opts = AutolinkOptions {
        jobs: args.jobs,
        target_dir: args.target,
        emit: EmitOptions {
            namespace: args.namespace,
        },
    };

    let progress = shell.progress("resolving");
    let result = autolink(&project, &opts, &progress);
    progress.finish();
    let result = result?;

    for path in &result.outcome.written {
        shell.status(Status::Created, path.display());
    }
    for path in &result.outcome.unchanged {
        shell.status(Status::Skipped, format!("{} (unchanged)", path.display()));
    }

    shell.status(
        Status::Finished,
        format!(
            "linked {} module(s) into {}",
            result.graph.modules.len(),
            result.target_dir.display()
        ),
    );
    Ok(())
}
