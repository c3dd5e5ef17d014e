//! `zettelflow init` - create the vault directories
//!
//! Idempotent: existing directories and notes are left alone.

use std::path::Path;

use serde_json::json;

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json_status};
use zettelflow_core::config::VaultConfig;
use zettelflow_core::error::Result;
use zettelflow_core::vault::{Location, Vault};

/// Execute the init command
pub fn execute(cli: &Cli, root: &Path, config: VaultConfig) -> Result<()> {
    let vault = Vault::init(root, config)?;
    let directories: Vec<String> = Location::ALL
        .iter()
        .map(|location| vault.dir(*location).display().to_string())
        .collect();

    output_by_format_result!(cli.format,
        json => print_json_status(
            "ok",
            Some("Vault initialized"),
            &[
                ("vault", json!(vault.root().display().to_string())),
                ("directories", json!(directories)),
            ],
        ),
        human => {
            println!("Initialized vault at {}", vault.root().display());
            if !cli.quiet {
                for dir in &directories {
                    println!("  {}", dir);
                }
            }
        }
    )
}
