//! `zettelflow config` - print the effective configuration

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use zettelflow_core::config::VaultConfig;
use zettelflow_core::error::{Result, ZettelError};

/// Print the resolved configuration as TOML (human) or JSON
pub fn execute(cli: &Cli, config: &VaultConfig) -> Result<()> {
    output_by_format_result!(cli.format,
        json => print_json(config),
        human => { print!("{}", render_toml(config)?); }
    )
}

fn render_toml(config: &VaultConfig) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| ZettelError::Other(format!("failed to serialize config: {}", e)))
}
