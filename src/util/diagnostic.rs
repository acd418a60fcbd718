//! User-friendly diagnostic messages.
//!
//! Every configuration error names the package and the file at fault and,
//! where one exists, a concrete fix.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no project root is found.
    pub const NO_PROJECT: &str =
        "Run inside a directory containing package.json or pass --project-root";

    /// Suggestion when a module config cannot be parsed.
    pub const INVALID_CONFIG: &str =
        "Check expo-module.config.json against the module config schema";

    /// Suggestion when two packages claim the same project name.
    pub const COLLISION: &str =
        "Remove one of the packages or give one of its projects an explicit `name`";

    /// Suggestion when a declared sub-project has no build file.
    pub const MISSING_BUILD_FILE: &str =
        "Add build.gradle to the project directory or fix its `path` in the module config";

    /// Suggestion when duplicate installs are found.
    pub const DUPLICATES: &str =
        "Deduplicate with your package manager (e.g. `npm dedupe`) or add a resolution";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            if self.suggestions.len() == 1 {
                output.push_str(&format!("{}: {}\n", help_prefix, self.suggestions[0]));
            } else {
                output.push_str(&format!("{}: consider:\n", help_prefix));
                for (i, suggestion) in self.suggestions.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
                }
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("project name `foo-bar` is claimed by two packages")
            .with_location("/repo/node_modules/foo-bar")
            .with_context("`foo-bar` at /repo/node_modules/foo-bar")
            .with_context("`@foo/bar` at /repo/node_modules/@foo/bar")
            .with_suggestion("Remove one of the packages")
            .with_suggestion("Rename a project");

        let output = diag.format(false);
        assert!(output.starts_with("error: project name `foo-bar`"));
        assert!(output.contains("  --> /repo/node_modules/foo-bar"));
        assert!(output.contains("  = `@foo/bar` at"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("2. Rename a project"));
    }

    #[test]
    fn test_single_suggestion_is_inline() {
        let output = Diagnostic::warning("duplicate install")
            .with_suggestion("dedupe")
            .format(false);
        assert_eq!(output, "warning: duplicate install\nhelp: dedupe\n");
    }
}
