//! Result types for promotion

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::note::NoteType;

/// A note that was moved out of the Inbox
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotedNote {
    pub note: String,
    pub note_type: NoteType,
    pub target: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

/// A candidate left in place because it did not pass the quality gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedNote {
    pub note: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

/// A candidate that could not be evaluated or moved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionFailure {
    pub note: String,
    pub error: String,
}

/// What a dry run would do with a qualifying note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewEntry {
    pub note: String,
    pub note_type: NoteType,
    pub destination: PathBuf,
    pub quality_score: f64,
}

/// Terminal state of one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromotionOutcome {
    Promoted(PromotedNote),
    /// Dry run: the note qualifies but was not touched
    WouldPromote(PreviewEntry),
    Skipped(SkippedNote),
    Errored(PromotionFailure),
}

/// Aggregate result of an auto-promotion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AutoPromoteReport {
    pub dry_run: bool,
    pub quality_threshold: f64,
    pub total_candidates: usize,
    pub promoted_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    /// Promoted notes per type
    pub by_type: BTreeMap<String, usize>,
    /// Dry run: qualifying notes per type
    pub would_promote: BTreeMap<String, usize>,
    pub would_promote_count: usize,
    pub promoted: Vec<PromotedNote>,
    pub skipped_notes: Vec<SkippedNote>,
    pub errors: Vec<PromotionFailure>,
    pub preview: Vec<PreviewEntry>,
}

impl AutoPromoteReport {
    pub(crate) fn new(dry_run: bool, quality_threshold: f64) -> Self {
        Self {
            dry_run,
            quality_threshold,
            ..Default::default()
        }
    }

    /// Fold one candidate's outcome into the totals
    pub fn record(&mut self, outcome: PromotionOutcome) {
        self.total_candidates += 1;
        match outcome {
            PromotionOutcome::Promoted(promoted) => {
                self.promoted_count += 1;
                *self
                    .by_type
                    .entry(promoted.note_type.to_string())
                    .or_insert(0) += 1;
                self.promoted.push(promoted);
            }
            PromotionOutcome::WouldPromote(entry) => {
                self.would_promote_count += 1;
                *self
                    .would_promote
                    .entry(entry.note_type.to_string())
                    .or_insert(0) += 1;
                self.preview.push(entry);
            }
            PromotionOutcome::Skipped(skipped) => {
                self.skipped_count += 1;
                self.skipped_notes.push(skipped);
            }
            PromotionOutcome::Errored(failure) => {
                self.error_count += 1;
                self.errors.push(failure);
            }
        }
    }
}

/// Result of a manual `promote <note> <type>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualPromotion {
    pub note: String,
    pub note_type: NoteType,
    pub from: PathBuf,
    pub to: PathBuf,
    /// False when the note was already published in its target directory
    pub changed: bool,
}
