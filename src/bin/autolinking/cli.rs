//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use autolinking::util::config::RawAutolinkingOptions;
use autolinking::Platform;

/// Autolinking - links native modules of installed packages into Android and Apple builds
#[derive(Parser)]
#[command(name = "autolinking")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve native modules and write the platform's build configuration
    Autolink(AutolinkArgs),

    /// Resolve native modules and print the result without writing anything
    Resolve(ResolveArgs),

    /// List the packages discovered in the search paths
    Search(SearchArgs),

    /// Check for duplicate installs and configuration errors
    Verify(VerifyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that loads a project.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (defaults to the nearest directory with a package.json)
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Directories to search for packages, in precedence order
    #[arg(long, value_name = "DIR", num_args = 1..)]
    pub search_paths: Option<Vec<PathBuf>>,

    /// Package names to leave out
    #[arg(long, value_name = "NAME", num_args = 1..)]
    pub exclude: Option<Vec<String>>,

    /// Link every discovered package, not only the project's dependencies
    #[arg(long)]
    pub all_packages: bool,
}

impl ProjectArgs {
    /// The command-line options layer.
    pub fn overrides(&self) -> RawAutolinkingOptions {
        RawAutolinkingOptions {
            search_paths: self.search_paths.clone(),
            exclude: self.exclude.clone(),
            only_project_deps: self.all_packages.then_some(false),
            ..Default::default()
        }
    }
}

#[derive(Args)]
pub struct AutolinkArgs {
    /// Platform to link (android, ios, macos, tvos)
    pub platform: Platform,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Package name patterns to build from source
    #[arg(long, value_name = "PATTERN", num_args = 1..)]
    pub build_from_source: Option<Vec<String>>,

    /// Output directory (defaults to <native project>/build/generated/autolinking)
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Java package of the generated package list
    #[arg(long, value_name = "NS", default_value = "expo.modules")]
    pub namespace: String,

    /// Number of resolver workers
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Platform to resolve (android, ios, macos, tvos)
    pub platform: Platform,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Package name patterns to build from source
    #[arg(long, value_name = "PATTERN", num_args = 1..)]
    pub build_from_source: Option<Vec<String>>,

    /// Print the resolved graph as JSON
    #[arg(long)]
    pub json: bool,

    /// Number of resolver workers
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Platform whose options apply
    #[arg(long, default_value = "android")]
    pub platform: Platform,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Platform to verify (android, ios, macos, tvos)
    pub platform: Platform,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Fail when a package is installed more than once
    #[arg(long)]
    pub strict: bool,

    /// Number of resolver workers
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}
