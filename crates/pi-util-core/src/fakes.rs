//! In-memory fake for [`CommandExecutor`] (testing only)
//!
//! `ScriptedExecutor` records every invocation and answers from a list of
//! canned responses, so multi-repo loops can be checked without git,
//! gclient or gn installed.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::command::{CapturedOutput, CommandExecutor, Invocation};
use crate::error::Result;

#[derive(Debug, Clone)]
struct Response {
    program: String,
    cwd: Option<PathBuf>,
    output: CapturedOutput,
}

impl Response {
    fn matches(&self, invocation: &Invocation) -> bool {
        self.program == invocation.program
            && self.cwd.as_ref().map_or(true, |cwd| *cwd == invocation.cwd)
    }
}

/// Records invocations and replays scripted results.
///
/// The first matching response wins; unmatched invocations succeed with
/// empty output.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: Vec<Response>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `program` with `stdout` and exit code 0.
    pub fn with_stdout(self, program: &str, stdout: &str) -> Self {
        self.with_response(
            program,
            None,
            CapturedOutput {
                exit_code: 0,
                stdout: stdout.as_bytes().to_vec(),
                stderr: String::new(),
            },
        )
    }

    /// Answer calls to `program` inside `cwd` with `stdout` and exit code 0.
    pub fn with_stdout_in(self, program: &str, cwd: impl Into<PathBuf>, stdout: &str) -> Self {
        self.with_response(
            program,
            Some(cwd.into()),
            CapturedOutput {
                exit_code: 0,
                stdout: stdout.as_bytes().to_vec(),
                stderr: String::new(),
            },
        )
    }

    /// Make calls to `program` inside `cwd` exit with `code`.
    pub fn with_exit_in(self, program: &str, cwd: impl Into<PathBuf>, code: i32) -> Self {
        self.with_response(
            program,
            Some(cwd.into()),
            CapturedOutput {
                exit_code: code,
                stdout: Vec::new(),
                stderr: format!("{program} failed"),
            },
        )
    }

    /// Make every call to `program` exit with `code`.
    pub fn with_exit(self, program: &str, code: i32) -> Self {
        self.with_response(
            program,
            None,
            CapturedOutput {
                exit_code: code,
                stdout: Vec::new(),
                stderr: format!("{program} failed"),
            },
        )
    }

    pub fn with_response(
        mut self,
        program: &str,
        cwd: Option<PathBuf>,
        output: CapturedOutput,
    ) -> Self {
        self.responses.push(Response {
            program: program.to_string(),
            cwd,
            output,
        });
        self
    }

    /// Every invocation seen so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Invocations of `program`, in call order.
    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.program == program)
            .collect()
    }

    fn answer(&self, invocation: &Invocation) -> CapturedOutput {
        self.calls.lock().unwrap().push(invocation.clone());
        self.responses
            .iter()
            .find(|r| r.matches(invocation))
            .map(|r| r.output.clone())
            .unwrap_or_default()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn capture(&self, invocation: &Invocation) -> Result<CapturedOutput> {
        Ok(self.answer(invocation))
    }

    fn status(&self, invocation: &Invocation) -> Result<i32> {
        Ok(self.answer(invocation).exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_response_wins() {
        let exec = ScriptedExecutor::new()
            .with_exit_in("git", "/w/dep", 3)
            .with_stdout("git", "ok\n");

        let dep = Invocation::new("git", ["status"], "/w/dep");
        let src = Invocation::new("git", ["status"], "/w/src");
        assert_eq!(exec.status(&dep).unwrap(), 3);
        assert_eq!(exec.capture(&src).unwrap().stdout, b"ok\n");
        assert_eq!(exec.calls(), vec![dep, src]);
    }

    #[test]
    fn test_unmatched_invocation_succeeds_empty() {
        let exec = ScriptedExecutor::new();
        let out = exec
            .capture(&Invocation::new("gn", ["gen", "out/armv7"], "/w/src"))
            .unwrap();
        assert!(out.success());
        assert!(out.stdout.is_empty());
        assert_eq!(exec.calls_to("gn").len(), 1);
    }
}
