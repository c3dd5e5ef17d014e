//! Batch processing of the Inbox

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{info, warn};

use super::{InboxProcessor, ProcessOutcome, ProcessResult, ProgressReporter};
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::note::{display_name, AiProcessed, Note, Recommendation};
use crate::vault::io::list_markdown;

/// Recommendation counts over the processed notes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TriageSummary {
    pub promote_to_permanent: usize,
    pub move_to_fleeting: usize,
    pub needs_improvement: usize,
}

impl TriageSummary {
    fn count(&mut self, recommendation: Recommendation) {
        match recommendation {
            Recommendation::PromoteToPermanent => self.promote_to_permanent += 1,
            Recommendation::MoveToFleeting => self.move_to_fleeting += 1,
            Recommendation::ImproveOrArchive => self.needs_improvement += 1,
        }
    }
}

/// Per-note entry of a batch run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Processed(ProcessResult),
    Failed { note: String, error: String },
}

/// Aggregate result of processing the Inbox
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub dry_run: bool,
    pub fast: bool,
    /// Markdown files in the Inbox
    pub total_files: usize,
    /// Already processed notes left out of this run
    pub skipped: usize,
    pub processed: usize,
    pub failed: usize,
    /// The run stopped early on user interrupt
    pub interrupted: bool,
    pub results: Vec<BatchEntry>,
    pub summary: TriageSummary,
}

/// Whether an earlier run already enriched this note
pub fn already_processed(note: &Note) -> bool {
    note.ai_processed() == AiProcessed::Flag(true) && note.recommendation().is_some()
}

impl<'a, M: LanguageModel + ?Sized> InboxProcessor<'a, M> {
    /// Process every eligible Inbox note, progress on stderr
    pub fn batch_process_inbox(&self, dry_run: bool, show_progress: bool) -> Result<BatchReport> {
        let mut progress = ProgressReporter::stderr(show_progress);
        self.batch_process_inbox_with(dry_run, false, &mut progress, None)
    }

    /// Process every eligible Inbox note in file name order.
    ///
    /// Notes already carrying `ai_processed: true` and a triage
    /// recommendation are skipped. A failure on one note is recorded and
    /// the run continues. Setting `interrupt` stops the run after the
    /// current note.
    #[tracing::instrument(skip(self, progress, interrupt))]
    pub fn batch_process_inbox_with<W: Write>(
        &self,
        dry_run: bool,
        fast: bool,
        progress: &mut ProgressReporter<W>,
        interrupt: Option<&AtomicBool>,
    ) -> Result<BatchReport> {
        let inbox = self.vault().require_inbox()?;
        let files = list_markdown(&inbox)?;
        let mut report = BatchReport {
            dry_run,
            fast,
            total_files: files.len(),
            ..Default::default()
        };

        let mut eligible = Vec::with_capacity(files.len());
        for path in files {
            match Note::load(&path) {
                Ok(note) if already_processed(&note) => report.skipped += 1,
                // Unreadable files still go through processing so the failure is recorded
                _ => eligible.push(path),
            }
        }

        let total = eligible.len();
        for (index, path) in eligible.iter().enumerate() {
            if interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                warn!(done = index, total, "batch interrupted");
                report.interrupted = true;
                break;
            }

            let name = display_name(path);
            progress.update(index + 1, total, &name);

            match self.process_inbox_note(path, dry_run, fast) {
                Ok(result) if result.outcome == ProcessOutcome::Failed => {
                    report.failed += 1;
                    report.results.push(BatchEntry::Failed {
                        note: name,
                        error: result.error.unwrap_or_default(),
                    });
                }
                Ok(result) => {
                    report.processed += 1;
                    if let Some(recommendation) = result.recommendation {
                        report.summary.count(recommendation);
                    }
                    report.results.push(BatchEntry::Processed(result));
                }
                Err(e) => {
                    warn!(note = %name, error = %e, "processing failed");
                    report.failed += 1;
                    report.results.push(BatchEntry::Failed {
                        note: name,
                        error: e.to_string(),
                    });
                }
            }
        }

        progress.finish(report.processed + report.failed);
        info!(
            total = report.total_files,
            skipped = report.skipped,
            processed = report.processed,
            failed = report.failed,
            "batch processing finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use crate::llm::gateway::{ENHANCE_TASK, TAG_TASK};
    use crate::llm::{EnrichmentError, ScriptedModel};
    use crate::vault::Vault;
    use std::fs;
    use tempfile::tempdir;

    fn setup(notes: &[(&str, &str)]) -> (tempfile::TempDir, Vault) {
        let dir = tempdir().unwrap();
        let vault = Vault::init(dir.path(), VaultConfig::default()).unwrap();
        for (name, content) in notes {
            fs::write(vault.inbox_dir().join(name), content).unwrap();
        }
        (dir, vault)
    }

    fn model(score: f64) -> ScriptedModel {
        ScriptedModel::new()
            .with_response(TAG_TASK, "[\"topic\"]")
            .with_response(
                ENHANCE_TASK,
                format!("{{\"quality_score\": {}, \"summary\": \"ok\"}}", score),
            )
    }

    #[test]
    fn test_skips_already_processed_notes() {
        let (_dir, vault) = setup(&[
            ("done.md", "---\ntype: fleeting\nstatus: promoted\nai_processed: true\ntriage_recommendation: move_to_fleeting\n---\nDone\n"),
            ("new.md", "---\ntype: fleeting\nstatus: inbox\ncreated: 2024-01-01 00:00\n---\nNew\n"),
        ]);
        let model = model(0.5);
        let processor = InboxProcessor::new(&vault, &model).unwrap();
        let mut progress = ProgressReporter::new(Vec::new(), false);

        let report = processor
            .batch_process_inbox_with(false, false, &mut progress, None)
            .unwrap();

        assert_eq!(report.total_files, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.processed, 1);
        assert_eq!(report.summary.move_to_fleeting, 1);
    }

    #[test]
    fn test_false_or_invalid_flag_is_not_skipped() {
        let (_dir, vault) = setup(&[
            ("a.md", "---\ntype: fleeting\nstatus: inbox\nai_processed: false\ntriage_recommendation: move_to_fleeting\n---\nA\n"),
            ("b.md", "---\ntype: fleeting\nstatus: inbox\nai_processed: yes\ntriage_recommendation: move_to_fleeting\n---\nB\n"),
        ]);
        let model = model(0.9);
        let processor = InboxProcessor::new(&vault, &model).unwrap();
        let mut progress = ProgressReporter::new(Vec::new(), false);

        let report = processor
            .batch_process_inbox_with(true, false, &mut progress, None)
            .unwrap();

        assert_eq!(report.skipped, 0);
        assert_eq!(report.processed, 2);
        assert_eq!(report.summary.promote_to_permanent, 2);
    }

    #[test]
    fn test_failures_are_recorded_and_batch_continues() {
        let (_dir, vault) = setup(&[
            ("a.md", "---\ntype: fleeting\nstatus: inbox\n---\nA\n"),
            ("b.md", "---\ntype: fleeting\nstatus: inbox\n---\nB\n"),
        ]);
        let model = ScriptedModel::new().unavailable();
        let processor = InboxProcessor::new(&vault, &model).unwrap();
        let mut progress = ProgressReporter::new(Vec::new(), false);

        let report = processor
            .batch_process_inbox_with(false, false, &mut progress, None)
            .unwrap();

        assert_eq!(report.failed, 2);
        assert_eq!(report.processed, 0);
        match &report.results[0] {
            BatchEntry::Failed { note, error } => {
                assert_eq!(note, "a.md");
                assert!(error.contains("unavailable"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_progress_lines_and_interrupt() {
        let (_dir, vault) = setup(&[
            ("a.md", "---\ntype: fleeting\nstatus: inbox\n---\nA\n"),
            ("b.md", "---\ntype: fleeting\nstatus: inbox\n---\nB\n"),
        ]);
        let model = model(0.2);
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let mut progress = ProgressReporter::new(Vec::new(), true);
        let report = processor
            .batch_process_inbox_with(true, true, &mut progress, None)
            .unwrap();
        let text = String::from_utf8(progress.into_inner()).unwrap();
        assert!(text.contains("[1/2] 50% - a.md"));
        assert!(text.contains("[2/2] 100% - b.md"));
        assert_eq!(report.processed, 2);

        let stop = AtomicBool::new(true);
        let mut quiet = ProgressReporter::new(Vec::new(), false);
        let report = processor
            .batch_process_inbox_with(true, true, &mut quiet, Some(&stop))
            .unwrap();
        assert!(report.interrupted);
        assert_eq!(report.processed, 0);
    }

    #[test]
    fn test_missing_inbox_is_an_error() {
        let dir = tempdir().unwrap();
        let vault = Vault::open(dir.path(), VaultConfig::default()).unwrap();
        let model = ScriptedModel::new().failing(TAG_TASK, EnrichmentError::Disabled);
        let processor = InboxProcessor::new(&vault, &model).unwrap();
        assert!(processor.batch_process_inbox(true, false).is_err());
    }
}
