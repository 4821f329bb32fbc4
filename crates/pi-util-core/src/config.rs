//! Superproject and tool configuration.
//!
//! The list of sub-repositories and the primary repository's pin live in a
//! TOML file (by default `pi-util/pipaths.toml` inside the primary
//! repository) and are handed explicitly to every operation:
//!
//! ```toml
//! primary = "src"
//! primary_revision = "3f1c2a9e"
//! paths = ["src", "src/third_party/ffmpeg", "src/v8"]
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PiUtilError, Result};

/// Location of the superproject file, relative to the primary repository.
pub const DEFAULT_CONFIG_FILE: &str = "pi-util/pipaths.toml";

/// Default directory name of the primary repository.
pub const DEFAULT_PRIMARY: &str = "src";

fn default_primary() -> String {
    DEFAULT_PRIMARY.to_string()
}

/// Sub-repository layout of a superproject checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperprojectConfig {
    /// Directory name of the primary repository; the tools must be run from
    /// inside it.
    #[serde(default = "default_primary")]
    pub primary: String,

    /// Pinned revision of the primary repository. gclient does not report
    /// it, so it is recorded here.
    pub primary_revision: String,

    /// Sub-repository paths relative to the base directory, in scan order.
    pub paths: Vec<String>,
}

impl SuperprojectConfig {
    pub fn new(
        primary: impl Into<String>,
        primary_revision: impl Into<String>,
        paths: Vec<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            primary_revision: primary_revision.into(),
            paths,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading superproject config from {:?}", path);
        let source = std::fs::read_to_string(path).map_err(|e| {
            PiUtilError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Pick the config file: an explicit path wins, otherwise
    /// [`DEFAULT_CONFIG_FILE`] under `primary_dir`.
    pub fn locate(explicit: Option<&Path>, primary_dir: &Path) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => primary_dir.join(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.primary.is_empty() || self.primary.contains('/') {
            return Err(PiUtilError::InvalidConfig(format!(
                "primary must be a single directory name, got {:?}",
                self.primary
            )));
        }
        if self.paths.is_empty() {
            return Err(PiUtilError::InvalidConfig("paths cannot be empty".into()));
        }
        if !self.paths.contains(&self.primary) {
            return Err(PiUtilError::InvalidConfig(format!(
                "paths must include the primary repository {:?}",
                self.primary
            )));
        }

        let mut seen = HashSet::new();
        for path in &self.paths {
            if !seen.insert(path.as_str()) {
                return Err(PiUtilError::InvalidConfig(format!(
                    "duplicate path {path:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Names of the external binaries the tools drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Version-control binary.
    pub git: String,
    /// Dependency-sync binary, queried with `revinfo`.
    pub gclient: String,
    /// Build-graph generator.
    pub gn: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            git: std::env::var("PI_UTIL_GIT").unwrap_or_else(|_| "git".to_string()),
            gclient: std::env::var("PI_UTIL_GCLIENT").unwrap_or_else(|_| "gclient".to_string()),
            gn: std::env::var("PI_UTIL_GN").unwrap_or_else(|_| "gn".to_string()),
        }
    }
}

impl ToolConfig {
    /// Create a config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Plain `git`, `gclient` and `gn`, ignoring the environment.
    pub fn standard() -> Self {
        ToolConfig {
            git: "git".to_string(),
            gclient: "gclient".to_string(),
            gn: "gn".to_string(),
        }
    }
}
