//! `dodiff` - one patch across every sub-repository.
//!
//! Diffs each sub-repository against its pinned revision and prints the
//! result with file paths relative to the checkout's base directory.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pi_util_core::telemetry::level_for;
use pi_util_core::{aggregate_diff, SuperprojectConfig, Superproject, SystemExecutor, ToolConfig};
use tracing::debug;

#[derive(Parser)]
#[command(name = "dodiff")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Aggregate git diffs against pinned revisions into one patch", long_about = None)]
struct Cli {
    /// Superproject config (default: pi-util/pipaths.toml in the primary repository)
    #[arg(long, env = "PI_UTIL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    pi_util_core::init_tracing(cli.json, level_for(cli.verbose));

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config_path = SuperprojectConfig::locate(cli.config.as_deref(), &cwd);
    let config = SuperprojectConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let executor = SystemExecutor;
    let project = Superproject::discover(&config, ToolConfig::from_env(), &cwd, &executor)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = aggregate_diff(&project, &executor, &mut out)?;
    out.flush()?;

    debug!(
        "Wrote {} lines from {} repositories",
        summary.lines, summary.repositories
    );
    Ok(())
}
