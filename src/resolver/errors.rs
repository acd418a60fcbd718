//! Configuration error types and diagnostics.
//!
//! Errors are collected across the whole run and reported together, so a
//! single invocation surfaces every misconfiguration at once.

use std::fmt;
use std::io;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// A fatal configuration error.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum AutolinkError {
    #[error("invalid module config for `{package}`: {message}")]
    #[diagnostic(code(autolinking::config::invalid))]
    InvalidModuleConfig {
        package: String,
        path: PathBuf,
        message: String,
    },

    #[error("invalid package.json at {}: {message}", .path.display())]
    #[diagnostic(code(autolinking::config::package_json))]
    InvalidPackageJson { path: PathBuf, message: String },

    #[error("project `{project}` of `{package}` has no build file")]
    #[diagnostic(
        code(autolinking::android::missing_build_file),
        help("Add build.gradle to the project directory or fix its `path`")
    )]
    MissingBuildFile {
        package: String,
        project: String,
        path: PathBuf,
    },

    #[error("`{package}` declares project name `{project}` more than once")]
    #[diagnostic(code(autolinking::android::duplicate_project))]
    DuplicateProjectName {
        package: String,
        project: String,
        path: PathBuf,
    },

    #[error("project name `{project}` is claimed by both `{first}` and `{second}`")]
    #[diagnostic(
        code(autolinking::merge::collision),
        help("Remove one of the packages or give one of its projects an explicit `name`")
    )]
    ProjectNameCollision {
        project: String,
        first: String,
        first_path: PathBuf,
        second: String,
        second_path: PathBuf,
    },

    #[error("failed to start worker pool: {message}")]
    #[diagnostic(code(autolinking::pool))]
    WorkerPool { message: String },

    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(autolinking::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AutolinkError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            AutolinkError::InvalidModuleConfig {
                package,
                path,
                message,
            } => Diagnostic::error(format!("invalid module config for `{}`", package))
                .with_location(path)
                .with_context(message.clone())
                .with_suggestion(suggestions::INVALID_CONFIG),

            AutolinkError::InvalidPackageJson { path, message } => {
                Diagnostic::error("invalid package.json")
                    .with_location(path)
                    .with_context(message.clone())
            }

            AutolinkError::MissingBuildFile {
                package,
                project,
                path,
            } => Diagnostic::error(format!(
                "project `{}` of `{}` has no build.gradle or build.gradle.kts",
                project, package
            ))
            .with_location(path)
            .with_suggestion(suggestions::MISSING_BUILD_FILE),

            AutolinkError::DuplicateProjectName {
                package,
                project,
                path,
            } => Diagnostic::error(format!(
                "`{}` declares project name `{}` more than once",
                package, project
            ))
            .with_location(path)
            .with_suggestion("Give each declared project a distinct `name` or `path`"),

            AutolinkError::ProjectNameCollision {
                project,
                first,
                first_path,
                second,
                second_path,
            } => Diagnostic::error(format!(
                "project name `{}` is claimed by both `{}` and `{}`",
                project, first, second
            ))
            .with_context(format!("`{}` at {}", first, first_path.display()))
            .with_context(format!("`{}` at {}", second, second_path.display()))
            .with_suggestion(suggestions::COLLISION),

            AutolinkError::WorkerPool { message } => {
                Diagnostic::error("failed to start worker pool").with_context(message.clone())
            }

            AutolinkError::Io { path, source } => Diagnostic::error(format!("failed to read file: {}", source))
                .with_location(path),
        }
    }
}

/// Every configuration error collected during a run.
#[derive(Debug, Default)]
pub struct AutolinkErrors(Vec<AutolinkError>);

impl AutolinkErrors {
    /// Create an empty collection.
    pub fn new() -> Self {
        AutolinkErrors(Vec::new())
    }

    /// Record an error.
    pub fn push(&mut self, error: AutolinkError) {
        self.0.push(error);
    }

    /// Append every error from `other`.
    pub fn extend(&mut self, other: AutolinkErrors) {
        self.0.extend(other.0);
    }

    /// Check if no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the recorded errors.
    pub fn iter(&self) -> impl Iterator<Item = &AutolinkError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, AutolinkErrors> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Diagnostics for every recorded error, in recording order.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.0.iter().map(AutolinkError::to_diagnostic).collect()
    }
}

impl From<AutolinkError> for AutolinkErrors {
    fn from(error: AutolinkError) -> Self {
        AutolinkErrors(vec![error])
    }
}

impl IntoIterator for AutolinkErrors {
    type Item = AutolinkError;
    type IntoIter = std::vec::IntoIter<AutolinkError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for AutolinkErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{}", single),
            errors => write!(f, "{} configuration errors found", errors.len()),
        }
    }
}

impl std::error::Error for AutolinkErrors {}
