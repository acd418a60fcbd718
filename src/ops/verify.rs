//! Project health check.
//!
//! Runs discovery and resolution without writing anything and reports
//! duplicate package installs alongside every configuration error.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Result;

use crate::core::package::DuplicateRevision;
use crate::core::project::Project;
use crate::discovery::collect_packages;
use crate::platforms::resolver_for;
use crate::resolver::{merge_graph, resolve_modules, AutolinkErrors, BuildFromSource};

/// Options for [`verify`].
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    pub jobs: Option<usize>,

    /// Treat duplicate installs as failures
    pub strict: bool,
}

/// What [`verify`] found.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of discovered packages
    pub packages: usize,

    /// Number of packages with something to link
    pub linked: usize,

    /// Shadowed installs by package name, with the path of the one in use
    pub duplicates: BTreeMap<String, (String, Vec<DuplicateRevision>)>,

    pub errors: AutolinkErrors,

    strict: bool,
}

impl VerifyResult {
    /// Whether the project passes.
    pub fn passed(&self) -> bool {
        self.errors.is_empty() && !(self.strict && !self.duplicates.is_empty())
    }
}

/// Check `project` for duplicates and configuration errors.
///
/// Configuration errors are part of the result rather than an `Err`; only
/// failures to run the check at all are returned as errors.
pub fn verify(project: &Project, opts: &VerifyOptions) -> Result<VerifyResult> {
    let mut result = VerifyResult {
        strict: opts.strict,
        ..Default::default()
    };

    let (found, errors) = collect_packages(project);
    result.errors = errors;
    result.packages = found.len();
    for (name, revisions) in found.duplicates() {
        let in_use = found
            .get(name)
            .map(|p| format!("{}@{} ({})", p.name(), p.version(), p.path().display()))
            .unwrap_or_default();
        result.duplicates.insert(name.clone(), (in_use, revisions.clone()));
    }

    let platform = project.platform();
    let resolver = resolver_for(platform, project.options());
    let (descriptors, errors) = resolve_modules(found.packages(), resolver.as_ref(), opts.jobs, |_| {});
    result.errors.extend(errors);

    let build_from_source = BuildFromSource::new(&project.options().build_from_source);
    match merge_graph(platform, descriptors, &build_from_source, None) {
        Ok(graph) => result.linked = graph.modules.len(),
        Err(errors) => result.errors.extend(errors),
    }
    Ok(result)
}

/// Format a verify result for display.
pub fn format_result(result: &VerifyResult) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{} packages found, {} with native modules",
        result.packages, result.linked
    );

    if !result.duplicates.is_empty() {
        let _ = writeln!(output, "\nDuplicate installs:");
        for (name, (in_use, revisions)) in &result.duplicates {
            let _ = writeln!(output, "  {}", name);
            let _ = writeln!(output, "    using   {}", in_use);
            for revision in revisions {
                let _ = writeln!(
                    output,
                    "    ignored {}@{} ({})",
                    name,
                    revision.version,
                    revision.path.display()
                );
            }
        }
    }

    if !result.errors.is_empty() {
        let _ = writeln!(output, "\n{} configuration error(s)", result.errors.len());
    }

    let status = if result.passed() { "PASSED" } else { "FAILED" };
    let _ = writeln!(output, "\nResult: {}", status);
    output
}
