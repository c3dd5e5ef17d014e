//! `zettelflow process-inbox` and `process-note`
//!
//! Batch runs install a Ctrl-C handler: the current note finishes, the
//! partial report is printed and the command exits with an interrupt error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::cli::paths::resolve_note_path;
use crate::cli::{Cli, ProcessInboxArgs, ProcessNoteArgs};
use crate::commands::format::{output_by_format_result, print_json, score};
use zettelflow_core::bail_usage;
use zettelflow_core::error::{Result, ZettelError};
use zettelflow_core::llm::LanguageModel;
use zettelflow_core::process::{
    BatchEntry, BatchReport, InboxProcessor, ProcessOutcome, ProcessResult, ProgressReporter,
};
use zettelflow_core::vault::Vault;

/// Execute process-inbox
pub fn execute_inbox(
    cli: &Cli,
    vault: &Vault,
    model: &dyn LanguageModel,
    args: &ProcessInboxArgs,
) -> Result<()> {
    let processor = InboxProcessor::new(vault, model)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "could not install interrupt handler");
    }

    let mut progress = ProgressReporter::stderr(!args.no_progress && !cli.quiet);
    let report = processor.batch_process_inbox_with(
        args.dry_run,
        args.fast,
        &mut progress,
        Some(interrupted.as_ref()),
    )?;

    output_by_format_result!(cli.format,
        json => print_json(&report),
        human => { print_batch(cli, &report); }
    )?;

    if report.interrupted {
        return Err(ZettelError::Interrupted);
    }
    Ok(())
}

/// Execute process-note
pub fn execute_note(
    cli: &Cli,
    vault: &Vault,
    model: &dyn LanguageModel,
    args: &ProcessNoteArgs,
) -> Result<()> {
    let path = resolve_note_path(&args.path, &vault.inbox_dir());
    if path.is_dir() {
        bail_usage!(format!("{} is a directory, not a note", path.display()));
    }
    if !path.is_file() {
        return Err(ZettelError::not_found(args.path.display()));
    }

    let processor = InboxProcessor::new(vault, model)?;
    let result = processor.process_inbox_note(&path, args.dry_run, args.fast)?;

    output_by_format_result!(cli.format,
        json => print_json(&result),
        human => { print_result(cli, &result); }
    )
}

fn print_batch(cli: &Cli, report: &BatchReport) {
    let prefix = if report.dry_run { "[dry run] " } else { "" };
    println!(
        "{}Processed {} notes ({} failed, {} already processed) of {} in the Inbox",
        prefix, report.processed, report.failed, report.skipped, report.total_files
    );

    if !cli.quiet {
        for entry in &report.results {
            match entry {
                BatchEntry::Processed(result) => println!(
                    "  {:<40} {:<10} score {}",
                    result.note,
                    outcome_label(result.outcome),
                    score(result.quality_score)
                ),
                BatchEntry::Failed { note, error } => println!("  {:<40} failed: {}", note, error),
            }
        }
    }

    let summary = &report.summary;
    println!();
    println!("Recommendations:");
    println!("  promote to permanent  {}", summary.promote_to_permanent);
    println!("  move to fleeting      {}", summary.move_to_fleeting);
    println!("  needs improvement     {}", summary.needs_improvement);

    if report.interrupted {
        println!();
        println!("Interrupted before the Inbox was finished.");
    }
}

fn print_result(cli: &Cli, result: &ProcessResult) {
    let prefix = if result.dry_run { "[dry run] " } else { "" };
    println!("{}{}: {}", prefix, result.note, outcome_label(result.outcome));

    for change in &result.repairs {
        println!(
            "  repaired {}: {} -> {}",
            change.field,
            change.from.as_deref().unwrap_or("(missing)"),
            change.to
        );
    }
    if let Some(error) = &result.error {
        println!("  error: {}", error);
    }
    if result.outcome == ProcessOutcome::Enriched {
        println!("  quality score: {}", score(result.quality_score));
        if let Some(recommendation) = result.recommendation {
            println!("  recommendation: {}", recommendation.as_str());
        }
        if !result.tags_added.is_empty() {
            println!("  tags added: {}", result.tags_added.join(", "));
        }
        if let Some(summary) = &result.summary {
            println!("  summary: {}", summary);
        }
    }

    if !cli.quiet {
        for suggestion in &result.suggestions {
            println!("  suggestion: {}", suggestion);
        }
        for connection in &result.connections {
            println!(
                "  related: {} ({:.2})",
                connection.filename, connection.similarity
            );
        }
    }
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
}

fn outcome_label(outcome: ProcessOutcome) -> &'static str {
    match outcome {
        ProcessOutcome::Enriched => "enriched",
        ProcessOutcome::Repaired => "repaired",
        ProcessOutcome::Failed => "failed",
    }
}
