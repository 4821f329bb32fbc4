//! `gitscan` - run a git command in every sub-repository.
//!
//! `{PATH}` in any argument becomes the sub-repository path and `{BASE}`
//! its pinned revision. Stops at the first failing repository and exits
//! with that command's code.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pi_util_core::{
    run_scan, ScanOptions, SuperprojectConfig, Superproject, SystemExecutor, ToolConfig,
};
use tracing::Level;

const USAGE: &str = "Usage: gitscan [--gitscan-no-src] <git cmd>\n  substitutes {PATH} and {BASE}";

#[derive(Parser)]
#[command(name = "gitscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run a git command across all sub-repositories", long_about = None)]
#[command(override_usage = "gitscan [--gitscan-no-src] <git cmd>")]
// --help and --version belong to git; with no git command the usage is printed
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Skip the primary repository
    #[arg(long = "gitscan-no-src")]
    no_src: bool,

    /// Do not print per-repository markers or failure details
    #[arg(long = "gitscan-quiet")]
    quiet: bool,

    /// Superproject config (default: pi-util/pipaths.toml in the primary repository)
    #[arg(long = "gitscan-config", env = "PI_UTIL_CONFIG")]
    config: Option<PathBuf>,

    /// Git subcommand and arguments; {PATH} and {BASE} are substituted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    git_args: Vec<String>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    pi_util_core::init_tracing(false, Level::WARN);

    if cli.git_args.is_empty() {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    }

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config_path = SuperprojectConfig::locate(cli.config.as_deref(), &cwd);
    let config = SuperprojectConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let executor = SystemExecutor;
    let project = Superproject::discover(&config, ToolConfig::from_env(), &cwd, &executor)?;

    let options = ScanOptions {
        skip_primary: cli.no_src,
        quiet: cli.quiet,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = run_scan(&project, &executor, &cli.git_args, options, &mut out)?;
    out.flush()?;

    Ok(ExitCode::from(exit_status(outcome.exit_code)))
}

/// Process exit status for a child exit code; out-of-range codes become 1.
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
