//! Error taxonomy for pi-util operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the pi-util library.
#[derive(Debug, Error)]
pub enum PiUtilError {
    /// The process was not started from inside the primary repository.
    #[error("working directory {cwd:?} does not end with /{primary}; run from inside the {primary} repository")]
    WrongWorkingDirectory { cwd: PathBuf, primary: String },

    /// An external tool could not be spawned at all.
    #[error("{tool} is not installed or not in PATH")]
    ToolNotFound { tool: String },

    /// An external tool ran but exited unsuccessfully.
    #[error("{tool} exited with code {code} in {cwd:?}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        cwd: PathBuf,
        stderr: String,
    },

    /// A tool running with inherited stdio exited unsuccessfully; its own
    /// diagnostics already went to the terminal.
    #[error("{tool} exited with code {code} in {cwd:?}")]
    ToolExited { tool: String, code: i32, cwd: PathBuf },

    /// A configured sub-repository has no pinned revision.
    #[error("no pinned revision for {path}")]
    RevisionNotFound { path: String },

    /// The superproject configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The credentials file is not a valid literal mapping.
    #[error("literal parse error at byte {offset}: {message}")]
    LiteralParse { offset: usize, message: String },

    /// The credentials file parsed but has no `variables` mapping.
    #[error("{path:?} has no 'variables' mapping")]
    MissingVariables { path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for pi-util operations.
pub type Result<T> = std::result::Result<T, PiUtilError>;
