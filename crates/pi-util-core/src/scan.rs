//! Run one git command across every sub-repository.
//!
//! Arguments may carry `{PATH}` (the sub-repository path) and `{BASE}` (its
//! pinned revision). Replacement is plain substring substitution with no
//! escaping.

use std::io::Write;

use tracing::{debug, warn};

use crate::command::{CommandExecutor, Invocation};
use crate::error::Result;
use crate::workspace::Superproject;

/// Replaced with the sub-repository path.
pub const PATH_TOKEN: &str = "{PATH}";
/// Replaced with the sub-repository's pinned revision.
pub const BASE_TOKEN: &str = "{BASE}";

/// Substitute `{PATH}` and `{BASE}` in every argument.
pub fn substitute_placeholders(args: &[String], path: &str, revision: &str) -> Vec<String> {
    args.iter()
        .map(|arg| arg.replace(PATH_TOKEN, path).replace(BASE_TOKEN, revision))
        .collect()
}

/// Knobs for [`run_scan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Leave the primary repository out.
    pub skip_primary: bool,
    /// Suppress the `>>> path` markers and the failure report.
    pub quiet: bool,
}

/// Result of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Exit code of the failing command, or 0 if every command succeeded.
    pub exit_code: i32,
    /// Paths a command was started in, in order.
    pub attempted: Vec<String>,
    /// Path whose command failed.
    pub failed: Option<String>,
}

impl ScanOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run `git <args>` in each sub-repository, stopping at the first non-zero
/// exit.
///
/// Children inherit stdio; progress and failure reports go to `out`. Each
/// child gets its own working directory, so the caller's working directory
/// is the same after the call whatever the outcome.
pub fn run_scan(
    project: &Superproject,
    executor: &dyn CommandExecutor,
    args: &[String],
    options: ScanOptions,
    out: &mut dyn Write,
) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();

    for entry in project.registry().iter() {
        if options.skip_primary && project.registry().is_primary(entry) {
            debug!("Skipping primary repository {}", entry.path);
            continue;
        }

        let invocation = Invocation::new(
            project.tools().git.as_str(),
            substitute_placeholders(args, &entry.path, &entry.revision),
            project.repo_dir(entry),
        );

        if !options.quiet {
            writeln!(out, ">>> {}", entry.path)?;
            out.flush()?;
        }

        outcome.attempted.push(entry.path.clone());
        let code = executor.status(&invocation)?;
        if code != 0 {
            warn!("{} exited with {} in {}", invocation, code, entry.path);
            if !options.quiet {
                writeln!(out, "Git returned non-zero error code {code}")?;
                writeln!(out, "cwd = {}", invocation.cwd.display())?;
                writeln!(out, "cmd = {invocation}")?;
            }
            outcome.exit_code = code;
            outcome.failed = Some(entry.path.clone());
            break;
        }
    }

    Ok(outcome)
}
