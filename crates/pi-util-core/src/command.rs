//! External tool invocation.
//!
//! Every operation talks to git, gclient and gn through [`CommandExecutor`]
//! so the multi-repo loops can be exercised without the real binaries.

use std::borrow::Cow;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{PiUtilError, Result};

/// A single external command: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
        }
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.argv())
    }
}

/// Output captured from a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code; `-1` when the child was killed by a signal.
    pub exit_code: i32,
    /// Raw stdout. Diff bodies may hold any encoding, so nothing is decoded.
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout decoded as UTF-8, invalid sequences replaced.
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Turn a non-zero exit into [`PiUtilError::ToolFailed`].
    pub fn into_success(self, invocation: &Invocation) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(PiUtilError::ToolFailed {
                tool: invocation.program.clone(),
                code: self.exit_code,
                cwd: invocation.cwd.clone(),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs external commands synchronously.
pub trait CommandExecutor {
    /// Run to completion, capturing stdout and stderr.
    fn capture(&self, invocation: &Invocation) -> Result<CapturedOutput>;

    /// Run to completion with inherited stdio, returning the exit code.
    fn status(&self, invocation: &Invocation) -> Result<i32>;
}

/// [`CommandExecutor`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).current_dir(&invocation.cwd);
        cmd
    }
}

impl CommandExecutor for SystemExecutor {
    fn capture(&self, invocation: &Invocation) -> Result<CapturedOutput> {
        debug!(cmd = %invocation, cwd = ?invocation.cwd, "capturing");
        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(&invocation.program, &invocation.cwd, e))?;

        Ok(CapturedOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn status(&self, invocation: &Invocation) -> Result<i32> {
        debug!(cmd = %invocation, cwd = ?invocation.cwd, "running");
        let status = Self::command(invocation)
            .status()
            .map_err(|e| spawn_error(&invocation.program, &invocation.cwd, e))?;
        Ok(status.code().unwrap_or(-1))
    }
}

fn spawn_error(program: &str, cwd: &Path, err: std::io::Error) -> PiUtilError {
    // A missing working directory also surfaces as NotFound.
    if err.kind() == ErrorKind::NotFound && cwd.is_dir() {
        PiUtilError::ToolNotFound {
            tool: program.to_string(),
        }
    } else {
        PiUtilError::Io(err)
    }
}
