//! pi-util Core Library
//!
//! Helpers for a gclient-managed superproject checkout: a primary
//! repository plus sub-repositories pinned to revisions reported by
//! `gclient revinfo`.
//!
//! - [`diff::aggregate_diff`]: one patch across every sub-repository
//! - [`scan::run_scan`]: one git command across every sub-repository
//! - [`gngen::GnGenerator`]: `out/armv6` and `out/armv7` GN build directories
//!
//! External tools are reached through [`command::CommandExecutor`];
//! [`fakes::ScriptedExecutor`] stands in for them in tests.

pub mod command;
pub mod config;
pub mod diff;
pub mod error;
pub mod fakes;
pub mod gngen;
pub mod literal;
pub mod registry;
pub mod revinfo;
pub mod scan;
pub mod telemetry;
pub mod workspace;

pub use command::{CapturedOutput, CommandExecutor, Invocation, SystemExecutor};
pub use config::{SuperprojectConfig, ToolConfig, DEFAULT_CONFIG_FILE, DEFAULT_PRIMARY};
pub use diff::{aggregate_diff, rewrite_diff, split_diff_lines, DiffSummary, HeaderRewriter};
pub use error::{PiUtilError, Result};
pub use gngen::{
    ensure_output_dir, gyp_include_path, load_gyp_variables, render_args, GnGenerator,
    GnSettings, GnTarget,
};
pub use literal::parse_literal;
pub use registry::{Registry, RegistryEntry};
pub use revinfo::{discover_revisions, parse_revinfo};
pub use scan::{run_scan, substitute_placeholders, ScanOptions, ScanOutcome};
pub use telemetry::init_tracing;
pub use workspace::{resolve_base_path, Superproject};

/// pi-util version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
