//! `autolinking verify` command

use anyhow::{bail, Result};

use autolinking::ops::{format_result, verify, VerifyOptions};
use autolinking::util::diagnostic::{self, suggestions, Diagnostic};
use autolinking::util::shell::{Shell, Status};

use crate::cli::VerifyArgs;
use crate::commands::load_project;

pub fn execute(args: VerifyArgs, shell: &Shell) -> Result<()> {
    let project = load_project(&args.project, args.platform, None)?;

    let opts = VerifyOptions {
        jobs: args.jobs,
        strict: args.strict,
    };
    let result = verify(&project, &opts)?;

    print!("{}", format_result(&result));

    for diag in result.errors.to_diagnostics() {
        diagnostic::emit(&diag, shell.use_color());
    }
    if args.strict && !result.duplicates.is_empty() {
        let diag = Diagnostic::error(format!(
            "{} package(s) installed more than once",
            result.duplicates.len()
        ))
        .with_suggestion(suggestions::DUPLICATES);
        diagnostic::emit(&diag, shell.use_color());
    }

    if !result.passed() {
        bail!("verification failed for {}", project.platform());
    }

    shell.status(Status::Finished, format!("{} verified", project.root().display()));
    Ok(())
}
