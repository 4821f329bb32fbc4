//! Base path resolution and the per-invocation superproject context.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::CommandExecutor;
use crate::config::{SuperprojectConfig, ToolConfig};
use crate::error::{PiUtilError, Result};
use crate::registry::{Registry, RegistryEntry};
use crate::revinfo::discover_revisions;

/// Strip the `/<primary>` suffix from `cwd`.
///
/// Fails unless `cwd` ends with that suffix, i.e. unless the tools are run
/// from the top of the primary repository. A primary directly under the
/// filesystem root gives `/`.
pub fn resolve_base_path(cwd: &Path, primary: &str) -> Result<PathBuf> {
    let suffix = format!("/{primary}");
    let cwd_str = cwd.to_string_lossy();

    match cwd_str.strip_suffix(suffix.as_str()) {
        Some("") => Ok(PathBuf::from("/")),
        Some(base) => Ok(PathBuf::from(base)),
        None => Err(PiUtilError::WrongWorkingDirectory {
            cwd: cwd.to_path_buf(),
            primary: primary.to_string(),
        }),
    }
}

/// Everything a multi-repo operation needs: where the checkout lives, which
/// sub-repositories exist, what they are pinned to and which binaries to run.
#[derive(Debug, Clone)]
pub struct Superproject {
    base: PathBuf,
    registry: Registry,
    tools: ToolConfig,
}

impl Superproject {
    pub fn new(base: impl Into<PathBuf>, registry: Registry, tools: ToolConfig) -> Self {
        Self {
            base: base.into(),
            registry,
            tools,
        }
    }

    /// Resolve the base path from `cwd`, ask gclient for pinned revisions
    /// and build the registry.
    pub fn discover(
        config: &SuperprojectConfig,
        tools: ToolConfig,
        cwd: &Path,
        executor: &dyn CommandExecutor,
    ) -> Result<Self> {
        let base = resolve_base_path(cwd, &config.primary)?;
        let discovered = discover_revisions(&tools, executor, cwd)?;
        let registry = Registry::build(config, &discovered)?;
        debug!(
            "Superproject at {:?} with {} repositories",
            base,
            registry.len()
        );
        Ok(Self::new(base, registry, tools))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    /// Absolute directory of a sub-repository.
    pub fn repo_dir(&self, entry: &RegistryEntry) -> PathBuf {
        self.base.join(&entry.path)
    }
}
