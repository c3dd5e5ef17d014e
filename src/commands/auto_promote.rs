//! `zettelflow auto-promote` - quality-gated promotion of Inbox notes

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json, score};
use zettelflow_core::error::Result;
use zettelflow_core::promote::{AutoPromoteReport, PromotionEngine};
use zettelflow_core::vault::Vault;

/// Execute auto-promote with the resolved threshold
pub fn execute(cli: &Cli, vault: &Vault, dry_run: bool, threshold: f64) -> Result<()> {
    let report = PromotionEngine::new(vault).auto_promote_ready_notes(dry_run, threshold)?;

    output_by_format_result!(cli.format,
        json => print_json(&report),
        human => { print_human(cli, &report); }
    )
}

fn print_human(cli: &Cli, report: &AutoPromoteReport) {
    if report.dry_run {
        println!(
            "[dry run] {} of {} candidates would be promoted (threshold {:.2})",
            report.would_promote_count, report.total_candidates, report.quality_threshold
        );
        for entry in &report.preview {
            println!(
                "  {} -> {} (score {:.2})",
                entry.note,
                entry.destination.display(),
                entry.quality_score
            );
        }
    } else {
        println!(
            "Promoted {} of {} candidates (threshold {:.2})",
            report.promoted_count, report.total_candidates, report.quality_threshold
        );
        for (note_type, count) in &report.by_type {
            println!("  {:<12} {:>5}", note_type, count);
        }
        if !cli.quiet {
            for promoted in &report.promoted {
                println!(
                    "  {} -> {} (score {})",
                    promoted.note,
                    promoted.target.display(),
                    score(promoted.quality_score)
                );
            }
        }
    }

    if !cli.quiet && !report.skipped_notes.is_empty() {
        println!();
        println!("Skipped ({}):", report.skipped_count);
        for skipped in &report.skipped_notes {
            println!("  {}: {}", skipped.note, skipped.reason);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors ({}):", report.error_count);
        for failure in &report.errors {
            println!("  {}: {}", failure.note, failure.error);
        }
    }
}
