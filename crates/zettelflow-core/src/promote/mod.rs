//! Promotion engine
//!
//! Moves Inbox notes marked `status: promoted` into the directory of their
//! type once their stored `quality_score` clears the threshold. Each
//! candidate ends in exactly one [`PromotionOutcome`]; a failure on one note
//! never stops the others.
//!
//! Only the header is rewritten (`status: published` plus `promoted_date`);
//! the body and every other key travel unchanged.

pub mod types;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::bail_invalid;
use crate::error::{Result, ZettelError};
use crate::note::{display_name, keys, Note, NoteStatus, NoteType};
use crate::time::now_timestamp;
use crate::vault::io::move_note;
use crate::vault::{Location, Vault};

pub use types::{
    AutoPromoteReport, ManualPromotion, PreviewEntry, PromotedNote, PromotionFailure,
    PromotionOutcome, SkippedNote,
};

/// A candidate that passed every check
#[derive(Debug)]
struct ReadyNote {
    note: Note,
    note_type: NoteType,
    quality_score: f64,
    destination_dir: PathBuf,
}

/// Quality-gated promotion out of the Inbox
#[derive(Debug, Clone, Copy)]
pub struct PromotionEngine<'a> {
    vault: &'a Vault,
}

impl<'a> PromotionEngine<'a> {
    pub fn new(vault: &'a Vault) -> Self {
        Self { vault }
    }

    /// Promote every qualifying Inbox note with `status: promoted`.
    ///
    /// `quality_threshold` is inclusive. With `dry_run` the filesystem is
    /// never touched; qualifying notes are listed in the preview instead.
    #[tracing::instrument(skip(self))]
    pub fn auto_promote_ready_notes(
        &self,
        dry_run: bool,
        quality_threshold: f64,
    ) -> Result<AutoPromoteReport> {
        if !quality_threshold.is_finite() || !(0.0..=1.0).contains(&quality_threshold) {
            bail_invalid!("quality threshold", quality_threshold);
        }

        let inbox = self.vault.require_inbox()?;
        let mut report = AutoPromoteReport::new(dry_run, quality_threshold);

        for path in crate::vault::io::list_markdown(&inbox)? {
            let note = match Note::load(&path) {
                Ok(note) => note,
                Err(e) => {
                    warn!(note = %display_name(&path), error = %e, "unreadable note");
                    report.record(PromotionOutcome::Errored(PromotionFailure {
                        note: display_name(&path),
                        error: e.to_string(),
                    }));
                    continue;
                }
            };
            if !is_candidate(&note) {
                continue;
            }

            let outcome = self.promote_candidate(note, dry_run, quality_threshold);
            report.record(outcome);
        }

        info!(
            candidates = report.total_candidates,
            promoted = report.promoted_count,
            would_promote = report.would_promote_count,
            skipped = report.skipped_count,
            errors = report.error_count,
            "auto-promotion finished"
        );
        Ok(report)
    }

    fn promote_candidate(&self, note: Note, dry_run: bool, threshold: f64) -> PromotionOutcome {
        let name = note.file_name();
        let ready = match self.evaluate(note, threshold) {
            Ok(ready) => ready,
            Err(outcome) => return outcome,
        };

        if dry_run {
            return PromotionOutcome::WouldPromote(PreviewEntry {
                note: name,
                note_type: ready.note_type,
                destination: ready.destination_dir,
                quality_score: ready.quality_score,
            });
        }

        match publish(ready.note, &ready.destination_dir) {
            Ok(target) => {
                info!(note = %name, target = %target.display(), "promoted");
                PromotionOutcome::Promoted(PromotedNote {
                    note: name,
                    note_type: ready.note_type,
                    target,
                    quality_score: Some(ready.quality_score),
                })
            }
            Err(e) => {
                warn!(note = %name, error = %e, "promotion failed");
                PromotionOutcome::Errored(PromotionFailure {
                    note: name,
                    error: e.to_string(),
                })
            }
        }
    }

    /// Check type, routing and quality; `Err` carries the terminal outcome
    fn evaluate(
        &self,
        note: Note,
        threshold: f64,
    ) -> std::result::Result<ReadyNote, PromotionOutcome> {
        let name = note.file_name();

        let note_type = match note.note_type() {
            Ok(Some(t)) => t,
            Ok(None) => {
                let error = ZettelError::missing_field(keys::TYPE, &name).to_string();
                return Err(errored(name, error));
            }
            Err(e) => return Err(errored(name, e.to_string())),
        };

        let quality_score = match note.quality_score() {
            Ok(Some(score)) => score,
            Ok(None) => {
                return Err(PromotionOutcome::Skipped(SkippedNote {
                    note: name,
                    reason: "no quality_score".to_string(),
                    quality_score: None,
                }))
            }
            Err(e) => return Err(errored(name, e.to_string())),
        };

        if quality_score < threshold {
            debug!(note = %name, quality_score, threshold, "below quality gate");
            return Err(PromotionOutcome::Skipped(SkippedNote {
                reason: format!(
                    "quality_score {:.2} below threshold {:.2}",
                    quality_score, threshold
                ),
                note: name,
                quality_score: Some(quality_score),
            }));
        }

        let destination_dir = self.vault.dir(Location::for_type(note_type));
        let destination = destination_dir.join(&name);
        if destination.exists() {
            let error = ZettelError::already_exists("destination note", destination.display());
            return Err(errored(name, error.to_string()));
        }

        Ok(ReadyNote {
            note,
            note_type,
            quality_score,
            destination_dir,
        })
    }

    /// Manually promote a note to `note_type`, bypassing the quality gate.
    ///
    /// The note is looked up by name in the Inbox first, then the other
    /// directories. A note already published in its target directory with
    /// the requested type is left alone.
    #[tracing::instrument(skip(self))]
    pub fn promote_note(&self, name: &str, note_type: NoteType) -> Result<ManualPromotion> {
        let path = self.vault.find_note(name)?;
        let mut note = Note::load(&path)?;
        let destination_dir = self.vault.dir(Location::for_type(note_type));

        let already_done = path.parent() == Some(destination_dir.as_path())
            && matches!(note.note_type(), Ok(Some(t)) if t == note_type)
            && matches!(note.status(), Ok(Some(NoteStatus::Published)));
        if already_done {
            debug!(note = %note.file_name(), "already published in place");
            return Ok(ManualPromotion {
                note: note.file_name(),
                note_type,
                from: path.clone(),
                to: path,
                changed: false,
            });
        }

        note.frontmatter.set(keys::TYPE, note_type.as_str());
        let to = publish(note, &destination_dir)?;
        info!(note = %display_name(&to), target = %to.display(), "promoted manually");
        Ok(ManualPromotion {
            note: display_name(&to),
            note_type,
            from: path,
            to,
            changed: true,
        })
    }
}

fn errored(note: String, error: String) -> PromotionOutcome {
    PromotionOutcome::Errored(PromotionFailure { note, error })
}

/// Whether a note is waiting for auto-promotion
fn is_candidate(note: &Note) -> bool {
    note.frontmatter
        .get_str(keys::STATUS)
        .is_some_and(|s| s.trim() == NoteStatus::Promoted.as_str())
}

/// Mark a note published and move it into `destination_dir`
fn publish(mut note: Note, destination_dir: &Path) -> Result<PathBuf> {
    note.frontmatter
        .set(keys::STATUS, NoteStatus::Published.as_str());
    note.frontmatter.set(keys::PROMOTED_DATE, now_timestamp());
    move_note(&note.path, destination_dir, &note.to_markdown())
}
