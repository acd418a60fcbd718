//! Autolinking CLI - links native modules of installed packages into native builds

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use autolinking::util::diagnostic::{self, suggestions, Diagnostic};
use autolinking::util::shell::{ColorChoice, Shell};
use autolinking::AutolinkErrors;
use autolinking::core::ProjectError;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = if cli.no_color { ColorChoice::Never } else { ColorChoice::Auto };
    let shell = Shell::from_flags(cli.quiet, cli.verbose, color);

    if let Err(e) = run(cli, &shell) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("autolinking=debug")
    } else if cli.quiet {
        EnvFilter::new("autolinking=error")
    } else {
        EnvFilter::new("autolinking=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Autolink(args) => commands::autolink::execute(args, shell),
        Commands::Resolve(args) => commands::resolve::execute(args, shell),
        Commands::Search(args) => commands::search::execute(args, shell),
        Commands::Verify(args) => commands::verify::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print `e`, expanding collected configuration errors one by one.
fn report(e: &anyhow::Error, shell: &Shell) {
    if let Some(errors) = e.downcast_ref::<AutolinkErrors>() {
        for diag in errors.to_diagnostics() {
            diagnostic::emit(&diag, shell.use_color());
        }
        if errors.len() > 1 {
            shell.error(errors);
        }
        return;
    }

    if let Some(ProjectError::NotFound { .. }) = e.downcast_ref::<ProjectError>() {
        let diag = Diagnostic::error(e.to_string()).with_suggestion(suggestions::NO_PROJECT);
        diagnostic::emit(&diag, shell.use_color());
        return;
    }

    eprintln!("error: {:#}", e);
}
