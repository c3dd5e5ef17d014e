//! Command implementations for all zettelflow commands

use crate::cli::Commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use zettelflow_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        dispatch_command::execute(self, ctx)
    }
}

pub(super) mod dispatch_command {
    use super::*;

    use crate::cli::{
        AutoPromoteArgs, ProcessInboxArgs, ProcessNoteArgs, PromoteArgs, RepairArgs, StatusArgs,
    };
    use crate::commands::dispatch::macros::trace_command;
    use crate::commands::{auto_promote, config, health, init, process, promote, repair, status};

    pub(super) fn execute(cmd: &Commands, ctx: &CommandContext) -> Result<()> {
        match cmd {
            Commands::Init => execute_init(ctx),
            Commands::Status(args) => execute_status(ctx, args),
            Commands::ProcessInbox(args) => execute_process_inbox(ctx, args),
            Commands::ProcessNote(args) => execute_process_note(ctx, args),
            Commands::Promote(args) => execute_promote(ctx, args),
            Commands::RepairInboxMetadata(args) => execute_repair(ctx, args),
            Commands::AutoPromote(args) => execute_auto_promote(ctx, args),
            Commands::Health => execute_health(ctx),
            Commands::Config => execute_config(ctx),
        }
    }

    fn execute_init(ctx: &CommandContext) -> Result<()> {
        let config = ctx.config()?;
        init::execute(ctx.cli, ctx.root, config)
    }

    fn execute_status(ctx: &CommandContext, args: &StatusArgs) -> Result<()> {
        let vault = ctx.open_vault()?;
        trace_command!(ctx.cli, ctx.start, "open_vault");
        let model = (!args.offline).then(|| ctx.model(&vault));
        status::execute(ctx.cli, &vault, model.as_deref())
    }

    fn execute_process_inbox(ctx: &CommandContext, args: &ProcessInboxArgs) -> Result<()> {
        let vault = ctx.open_vault()?;
        trace_command!(ctx.cli, ctx.start, "open_vault");
        let model = ctx.model(&vault);
        process::execute_inbox(ctx.cli, &vault, &*model, args)
    }

    fn execute_process_note(ctx: &CommandContext, args: &ProcessNoteArgs) -> Result<()> {
        let vault = ctx.open_vault()?;
        trace_command!(ctx.cli, ctx.start, "open_vault");
        let model = ctx.model(&vault);
        process::execute_note(ctx.cli, &vault, &*model, args)
    }

    fn execute_promote(ctx: &CommandContext, args: &PromoteArgs) -> Result<()> {
        let vault = ctx.open_vault()?;
        promote::execute(ctx.cli, &vault, &args.note, args.note_type)
    }

    fn execute_repair(ctx: &CommandContext, args: &RepairArgs) -> Result<()> {
        let vault = ctx.open_vault()?;
        repair::execute(ctx.cli, &vault, args.execute)
    }

    fn execute_auto_promote(ctx: &CommandContext, args: &AutoPromoteArgs) -> Result<()> {
        let vault = ctx.open_vault()?;
        let threshold = args
            .quality_threshold
            .unwrap_or(vault.config().promotion.quality_threshold);
        auto_promote::execute(ctx.cli, &vault, args.dry_run, threshold)
    }

    fn execute_health(ctx: &CommandContext) -> Result<()> {
        let config = ctx.config()?;
        health::execute(ctx.cli, &config)
    }

    fn execute_config(ctx: &CommandContext) -> Result<()> {
        let config = ctx.config()?;
        config::execute(ctx.cli, &config)
    }
}
