//! `gngen` - generate the armv6/armv7 GN build directories.
//!
//! Run from the top of the primary repository. Credentials are read from
//! `~/.gyp/include.gypi` when it exists.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pi_util_core::telemetry::level_for;
use pi_util_core::{
    gyp_include_path, load_gyp_variables, GnGenerator, GnSettings, GnTarget, SystemExecutor,
    ToolConfig,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "gngen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate out/armv6 and out/armv7 GN build directories", long_about = None)]
struct Cli {
    /// Credentials file (default: ~/.gyp/include.gypi)
    #[arg(long, env = "PI_UTIL_GYPI")]
    gypi: Option<PathBuf>,

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

    let root = std::env::current_dir().context("Failed to read working directory")?;

    let variables = match cli.gypi.or_else(gyp_include_path) {
        Some(path) => {
            let vars = load_gyp_variables(&path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            if vars.is_some() {
                println!("Importing from: {}", path.display());
            }
            vars.unwrap_or_default()
        }
        None => Default::default(),
    };

    let generator_name = std::env::args().next().unwrap_or_else(|| "gngen".to_string());
    let tools = ToolConfig::from_env();
    let executor = SystemExecutor;
    let generator = GnGenerator::new(&root, generator_name, &tools, &executor);

    let settings = GnSettings::from_variables(
        &variables,
        generator.default_sysroot().to_string_lossy(),
    );
    let written = generator.generate_all(&GnTarget::defaults(), &settings)?;

    info!("Generated {} build directories", written.len());
    Ok(())
}
