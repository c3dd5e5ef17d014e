//! Reporting command argument structures

use clap::Args;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Skip the language model availability probe
    #[arg(long)]
    pub offline: bool,
}
