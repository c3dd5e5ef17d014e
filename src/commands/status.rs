//! `zettelflow status` - vault analytics

use chrono::Local;

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use zettelflow_core::error::Result;
use zettelflow_core::llm::LanguageModel;
use zettelflow_core::report::{vault_status, VaultStatus};
use zettelflow_core::vault::Vault;

/// Notes listed per section in human output before eliding
const HUMAN_LIST_LIMIT: usize = 10;

/// Execute the status command; `model` is probed unless offline
pub fn execute(cli: &Cli, vault: &Vault, model: Option<&dyn LanguageModel>) -> Result<()> {
    let mut status = vault_status(vault, Local::now())?;
    if let Some(model) = model {
        status = status.with_llm_health(model);
    }

    output_by_format_result!(cli.format,
        json => print_json(&status),
        human => { print_human(cli, &status); }
    )
}

fn print_human(cli: &Cli, status: &VaultStatus) {
    println!("Vault: {}", status.vault.display());
    println!("Notes: {}", status.total_notes);
    for dir in &status.directories {
        println!("  {:<12} {:>5}", dir.location.to_string(), dir.notes);
    }

    if !status.inbox_by_status.is_empty() {
        println!();
        println!("Inbox by status:");
        for (key, count) in &status.inbox_by_status {
            println!("  {:<12} {:>5}", key, count);
        }
    }
    println!("Promotion candidates: {}", status.promotion_candidates);

    let productivity = &status.productivity;
    println!();
    println!(
        "Created: {} in 7 days, {} in 30 days",
        productivity.created_last_7_days, productivity.created_last_30_days
    );
    match productivity.average_quality {
        Some(avg) => println!(
            "Average quality: {:.2} over {} scored notes",
            avg, productivity.scored_notes
        ),
        None => println!("Average quality: no scored notes"),
    }
    println!("AI processed: {}", productivity.ai_processed);

    if let Some(llm) = &status.llm {
        let state = if llm.available { "available" } else { "unreachable" };
        println!("Language model: {} ({})", llm.model, state);
    }

    if cli.quiet {
        return;
    }

    print_list(
        "Orphans",
        status.orphans.iter().map(|name| name.to_string()),
        status.orphans.len(),
    );
    print_list(
        "Stale Inbox notes",
        status
            .stale
            .iter()
            .map(|s| format!("{} ({} days)", s.note, s.age_days)),
        status.stale.len(),
    );
    print_list(
        "Location mismatches",
        status.location_mismatches.iter().map(|m| match m.expected {
            Some(expected) => format!("{} in {}: {} (expected {})", m.note, m.location, m.reason, expected),
            None => format!("{} in {}: {}", m.note, m.location, m.reason),
        }),
        status.location_mismatches.len(),
    );

    for warning in &status.warnings {
        eprintln!("warning: {}", warning);
    }
}

fn print_list(title: &str, items: impl Iterator<Item = String>, total: usize) {
    if total == 0 {
        return;
    }
    println!();
    println!("{} ({}):", title, total);
    for item in items.take(HUMAN_LIST_LIMIT) {
        println!("  {}", item);
    }
    if total > HUMAN_LIST_LIMIT {
        println!("  ... and {} more", total - HUMAN_LIST_LIMIT);
    }
}
