//! Multi-repo diff aggregation.
//!
//! Each sub-repository's `git diff` reports paths relative to its own root.
//! Splicing the sub-repository path into the `a/` and `b/` markers of every
//! file header turns the concatenation into one patch rooted at the base
//! directory. Hunk bodies are never touched.

use std::borrow::Cow;
use std::io::Write;

use tracing::debug;

use crate::command::{CommandExecutor, Invocation};
use crate::error::Result;
use crate::workspace::Superproject;

const DIFF_START: &[u8] = b"diff --git ";
const NEW_FILE_MARKER: &[u8] = b"+++ ";
const OLD_PREFIX: &[u8] = b" a/";
const NEW_PREFIX: &[u8] = b" b/";

/// Split diff output into lines, dropping the single empty segment left by
/// a trailing newline.
pub fn split_diff_lines(text: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = text.split(|b| *b == b'\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Replace every occurrence of `from` in `haystack`, left to right.
fn replace_bytes(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len() + to.len());
    let mut rest = haystack;
    while let Some(at) = rest.windows(from.len()).position(|w| w == from) {
        out.extend_from_slice(&rest[..at]);
        out.extend_from_slice(to);
        rest = &rest[at + from.len()..];
    }
    out.extend_from_slice(rest);
    out
}

/// Line-at-a-time header rewriter for one sub-repository.
///
/// Works on raw bytes: source files in a large checkout are not all UTF-8
/// and the patch must still apply.
#[derive(Debug, Clone)]
pub struct HeaderRewriter {
    in_header: bool,
    old_anchor: Vec<u8>,
    new_anchor: Vec<u8>,
}

impl HeaderRewriter {
    pub fn new(path: &str) -> Self {
        Self {
            in_header: false,
            old_anchor: format!(" a/{path}/").into_bytes(),
            new_anchor: format!(" b/{path}/").into_bytes(),
        }
    }

    /// Whether the previous line left a header region open.
    pub fn in_header(&self) -> bool {
        self.in_header
    }

    /// Rewrite one line, updating the header state.
    ///
    /// `diff --git ` opens a header region, `+++ ` closes it after being
    /// rewritten itself.
    pub fn rewrite<'l>(&mut self, line: &'l [u8]) -> Cow<'l, [u8]> {
        if line.starts_with(DIFF_START) {
            self.in_header = true;
        }

        let rewritten = if self.in_header {
            let old = replace_bytes(line, OLD_PREFIX, &self.old_anchor);
            Cow::Owned(replace_bytes(&old, NEW_PREFIX, &self.new_anchor))
        } else {
            Cow::Borrowed(line)
        };

        if line.starts_with(NEW_FILE_MARKER) {
            self.in_header = false;
        }

        rewritten
    }
}

/// Rewrite the whole diff output of the sub-repository at `path`.
pub fn rewrite_diff(path: &str, text: &[u8]) -> Vec<Vec<u8>> {
    let mut rewriter = HeaderRewriter::new(path);
    split_diff_lines(text)
        .into_iter()
        .map(|line| rewriter.rewrite(line).into_owned())
        .collect()
}

/// What [`aggregate_diff`] produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub repositories: usize,
    pub lines: usize,
}

/// Diff every sub-repository against its pinned revision and write the
/// combined, path-prefixed patch to `out`.
///
/// A diff command that exits non-zero aborts the aggregation; plain
/// `git diff` exits 0 whether or not there are differences.
pub fn aggregate_diff(
    project: &Superproject,
    executor: &dyn CommandExecutor,
    out: &mut dyn Write,
) -> Result<DiffSummary> {
    let mut summary = DiffSummary::default();

    for entry in project.registry().iter() {
        let invocation = Invocation::new(
            project.tools().git.as_str(),
            ["diff", entry.revision.as_str()],
            project.repo_dir(entry),
        );
        let output = executor.capture(&invocation)?.into_success(&invocation)?;

        let lines = rewrite_diff(&entry.path, &output.stdout);
        debug!("{}: {} diff lines", entry.path, lines.len());
        for line in &lines {
            out.write_all(line)?;
            out.write_all(b"\n")?;
        }

        summary.repositories += 1;
        summary.lines += lines.len();
    }

    out.flush()?;
    Ok(summary)
}
