//! CLI argument parsing for zettelflow
//!
//! Global flags: --vault, --config, --format, --quiet, --verbose

pub mod commands;
pub mod format;
pub mod output;
pub mod parse;
pub mod paths;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::{
    AutoPromoteArgs, ProcessInboxArgs, ProcessNoteArgs, PromoteArgs, RepairArgs, StatusArgs,
};
pub use output::OutputFormat;

/// Zettelflow - Zettelkasten inbox automation
#[derive(Parser, Debug)]
#[command(name = "zettelflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault root directory (defaults to the current directory)
    #[arg(long, global = true, env = "ZETTELFLOW_VAULT")]
    pub vault: Option<PathBuf>,

    /// Configuration file (overrides <vault>/.zettelflow.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Report timing for major phases
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. debug, zettelflow_core=trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the Inbox and note directories
    Init,

    /// Show vault analytics
    Status(StatusArgs),

    /// Repair and enrich every unprocessed Inbox note
    ProcessInbox(ProcessInboxArgs),

    /// Repair and enrich a single note
    ProcessNote(ProcessNoteArgs),

    /// Publish a note as the given type, without a quality gate
    Promote(PromoteArgs),

    /// Fix missing or placeholder metadata in the Inbox
    RepairInboxMetadata(RepairArgs),

    /// Promote Inbox notes whose quality score meets the threshold
    AutoPromote(AutoPromoteArgs),

    /// Check that the language model service is reachable
    Health,

    /// Print the effective configuration
    Config,
}
