//! Command trait and context for dispatching commands

use std::path::Path;
use std::time::Instant;

use crate::cli::Cli;
use zettelflow_core::config::VaultConfig;
use zettelflow_core::error::Result;
use zettelflow_core::llm::{self, LanguageModel};
use zettelflow_core::vault::Vault;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub root: &'a Path,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, root: &'a Path, start: Instant) -> Self {
        Self { cli, root, start }
    }

    /// Effective configuration: `--config`, vault file, global file, defaults
    pub fn config(&self) -> Result<VaultConfig> {
        VaultConfig::resolve(self.root, self.cli.config.as_deref())
    }

    /// Open the vault at the resolved root with the effective configuration
    pub fn open_vault(&self) -> Result<Vault> {
        let config = self.config()?;
        Vault::open(self.root, config)
    }

    /// Language model backend configured for this vault
    pub fn model(&self, vault: &Vault) -> Box<dyn LanguageModel> {
        llm::from_config(&vault.config().llm)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("zettelflow {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Inbox repair, AI enrichment and promotion for a Zettelkasten vault.");
        println!();
        println!("Run `zettelflow --help` for usage information.");
        Ok(())
    }
}
