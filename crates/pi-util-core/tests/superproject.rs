//! Revision discovery and registry construction through the executor seam.

use std::path::Path;

use pi_util_core::fakes::ScriptedExecutor;
use pi_util_core::{
    run_scan, PiUtilError, ScanOptions, Superproject, SuperprojectConfig, ToolConfig,
};

const REVINFO: &str = "\
src: https://chromium.googlesource.com/chromium/src.git
src/third_party/ffmpeg: https://github.com/RPi-Distro/ffmpeg.git@8a1b2c3
src/v8: https://chromium.googlesource.com/v8/v8.git@d4e5f6a
";

fn config() -> SuperprojectConfig {
    SuperprojectConfig::from_toml_str(
        r#"
primary = "src"
primary_revision = "r0"
paths = ["src", "src/third_party/ffmpeg", "src/v8"]
"#,
    )
    .unwrap()
}

#[test]
fn status_runs_once_per_repository_in_order() {
    let exec = ScriptedExecutor::new().with_stdout("gclient", REVINFO);
    let project = Superproject::discover(
        &config(),
        ToolConfig::standard(),
        Path::new("/home/pi/chromium/src"),
        &exec,
    )
    .unwrap();

    let mut out = Vec::new();
    let outcome = run_scan(
        &project,
        &exec,
        &["status".to_string()],
        ScanOptions::default(),
        &mut out,
    )
    .unwrap();
    assert!(outcome.success());

    let git_calls = exec.calls_to("git");
    let dirs: Vec<_> = git_calls.iter().map(|c| c.cwd.clone()).collect();
    assert_eq!(
        dirs,
        vec![
            Path::new("/home/pi/chromium/src").to_path_buf(),
            Path::new("/home/pi/chromium/src/third_party/ffmpeg").to_path_buf(),
            Path::new("/home/pi/chromium/src/v8").to_path_buf(),
        ]
    );
    assert!(git_calls.iter().all(|c| c.argv() == vec!["git", "status"]));
}

#[test]
fn base_token_uses_discovered_revision() {
    let exec = ScriptedExecutor::new().with_stdout("gclient", REVINFO);
    let project = Superproject::discover(
        &config(),
        ToolConfig::standard(),
        Path::new("/w/src"),
        &exec,
    )
    .unwrap();

    let args = vec!["diff".to_string(), "{BASE}".to_string(), "--".to_string(), "{PATH}".to_string()];
    let options = ScanOptions {
        skip_primary: true,
        quiet: true,
    };
    let mut out = Vec::new();
    run_scan(&project, &exec, &args, options, &mut out).unwrap();

    let git_calls = exec.calls_to("git");
    assert_eq!(git_calls.len(), 2);
    assert_eq!(
        git_calls[0].argv(),
        vec!["git", "diff", "8a1b2c3", "--", "src/third_party/ffmpeg"]
    );
    assert_eq!(
        git_calls[1].argv(),
        vec!["git", "diff", "d4e5f6a", "--", "src/v8"]
    );
}

#[test]
fn gclient_failure_aborts_discovery() {
    let exec = ScriptedExecutor::new().with_exit("gclient", 2);
    let err = Superproject::discover(
        &config(),
        ToolConfig::standard(),
        Path::new("/w/src"),
        &exec,
    )
    .unwrap_err();
    assert!(matches!(err, PiUtilError::ToolFailed { code: 2, .. }));
}

#[test]
fn unpinned_dependency_aborts_discovery() {
    let exec = ScriptedExecutor::new().with_stdout(
        "gclient",
        "src/v8: https://chromium.googlesource.com/v8/v8.git@d4e5f6a\n",
    );
    let err = Superproject::discover(
        &config(),
        ToolConfig::standard(),
        Path::new("/w/src"),
        &exec,
    )
    .unwrap_err();
    assert!(matches!(err, PiUtilError::RevisionNotFound { .. }));
}
