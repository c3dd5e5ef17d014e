//! `zettelflow repair-inbox-metadata` - fix capture metadata in the Inbox

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use zettelflow_core::error::Result;
use zettelflow_core::repair::{MetadataRepair, RepairSummary};
use zettelflow_core::vault::Vault;

/// Execute the repair command (report only unless `execute`)
pub fn execute(cli: &Cli, vault: &Vault, execute: bool) -> Result<()> {
    let summary = MetadataRepair::new(vault)?.repair_all(execute)?;

    output_by_format_result!(cli.format,
        json => print_json(&summary),
        human => { print_human(cli, &summary); }
    )
}

fn print_human(cli: &Cli, summary: &RepairSummary) {
    let verb = if summary.execute { "Repaired" } else { "Would repair" };
    println!(
        "{} {} of {} notes",
        verb,
        if summary.execute {
            summary.repairs_made
        } else {
            summary.repairs_needed
        },
        summary.notes_scanned
    );

    if !cli.quiet {
        for result in summary.results.iter().filter(|r| r.needed) {
            println!("  {}", result.note);
            for change in &result.changes {
                println!(
                    "    {}: {} -> {}",
                    change.field,
                    change.from.as_deref().unwrap_or("(missing)"),
                    change.to
                );
            }
        }
    }

    for error in &summary.errors {
        eprintln!("warning: {}", error);
    }
    if !summary.execute && summary.repairs_needed > 0 && !cli.quiet {
        println!();
        println!("Run with --execute to write these repairs.");
    }
}
