//! Lifecycle command argument structures

use std::path::PathBuf;

use clap::Args;

use crate::cli::parse::{parse_note_type, parse_threshold};
use zettelflow_core::note::NoteType;

/// Arguments for the process-inbox command.
#[derive(Args, Debug)]
pub struct ProcessInboxArgs {
    /// Compute results without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Repair metadata only, skip every model call
    #[arg(long)]
    pub fast: bool,

    /// Do not print progress lines on stderr
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the process-note command.
#[derive(Args, Debug)]
pub struct ProcessNoteArgs {
    /// Note file path, or a file name inside the Inbox
    pub path: PathBuf,

    /// Compute the result without writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Repair metadata only, skip every model call
    #[arg(long)]
    pub fast: bool,
}

/// Arguments for the promote command.
#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Note file name, with or without `.md`
    pub note: String,

    /// Target type: fleeting, literature or permanent
    #[arg(value_name = "TYPE", value_parser = parse_note_type)]
    pub note_type: NoteType,
}

/// Arguments for the repair-inbox-metadata command.
#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Write the repairs (default only reports them)
    #[arg(long)]
    pub execute: bool,
}

/// Arguments for the auto-promote command.
#[derive(Args, Debug)]
pub struct AutoPromoteArgs {
    /// Report what would be promoted without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Minimum quality score, 0.0 to 1.0 (default from config)
    #[arg(long, value_parser = parse_threshold)]
    pub quality_threshold: Option<f64>,
}
