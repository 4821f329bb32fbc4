//! Pinned revision discovery via `gclient revinfo`.
//!
//! `gclient revinfo` prints one line per dependency:
//!
//! ```text
//! src/third_party/ffmpeg: https://chromium.googlesource.com/chromium/third_party/ffmpeg.git@8f2a1d0c
//! ```
//!
//! The path is everything before the first `:`, the revision everything
//! after the last `@`.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::command::{CommandExecutor, Invocation};
use crate::config::ToolConfig;
use crate::error::Result;

/// Parse revinfo output into a path -> revision map.
///
/// Lines lacking either delimiter are skipped. A later line for the same
/// path replaces an earlier one.
pub fn parse_revinfo(text: &str) -> BTreeMap<String, String> {
    let mut revisions = BTreeMap::new();

    for line in text.lines() {
        match (line.find(':'), line.rfind('@')) {
            (Some(path_end), Some(at)) => {
                revisions.insert(line[..path_end].to_string(), line[at + 1..].to_string());
            }
            _ => {
                if !line.is_empty() {
                    debug!("Skipping revinfo line without path/revision: {:?}", line);
                }
            }
        }
    }

    revisions
}

/// Run `gclient revinfo` in `cwd` and parse the result.
///
/// A missing binary or a non-zero exit fails the whole discovery.
pub fn discover_revisions(
    tools: &ToolConfig,
    executor: &dyn CommandExecutor,
    cwd: &Path,
) -> Result<BTreeMap<String, String>> {
    let invocation = Invocation::new(tools.gclient.as_str(), ["revinfo"], cwd);
    let output = executor.capture(&invocation)?.into_success(&invocation)?;

    let revisions = parse_revinfo(&output.stdout_lossy());
    debug!("Discovered {} pinned revisions", revisions.len());
    Ok(revisions)
}
