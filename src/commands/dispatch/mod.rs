//! Command dispatch logic for zettelflow

use std::time::Instant;

use crate::cli::paths::resolve_vault_path;
use crate::cli::Cli;
use tracing::debug;
use zettelflow_core::error::Result;
use zettelflow_core::trace_time;

mod command;
mod commands;
pub(crate) mod macros;

use command::{Command, CommandContext, NoCommand};

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let root = resolve_vault_path(cli.vault.as_deref());

    debug!(elapsed = ?start.elapsed(), root = %root.display(), "resolve_vault");

    let ctx = CommandContext::new(cli, &root, start);

    let result = match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    };

    trace_time!(start, "command_complete", ok = result.is_ok());
    result
}
