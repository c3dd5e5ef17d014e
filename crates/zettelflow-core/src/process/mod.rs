//! Inbox enrichment
//!
//! Processing a note always runs metadata repair. The full path then asks
//! the language model for tags, a quality assessment and candidate
//! connections, stores the results in the header and moves the note from
//! `status: inbox` to `status: promoted`. The status only changes when the
//! whole AI path succeeded: fast runs and failed calls keep `created`
//! repairs but never add, drop or rewrite `status`.

pub mod batch;
pub mod progress;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ProcessingConfig;
use crate::connections::{lexical_similar_notes, ConnectionDiscovery, SimilarNote};
use crate::error::Result;
use crate::llm::{Enhancement, EnrichmentError, LanguageModel, QualityGateway};
use crate::note::{keys, AiProcessed, Note, NoteStatus, Recommendation};
use crate::repair::{apply_changes, FieldChange, MetadataRepair, RepairReason};
use crate::time::{file_timestamp, now_timestamp};
use crate::vault::{Location, Vault};

pub use batch::{BatchEntry, BatchReport, TriageSummary};
pub use progress::ProgressReporter;

/// How processing of one note ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessOutcome {
    /// AI path completed; the note is ready for promotion
    Enriched,
    /// Fast mode: metadata repair only
    Repaired,
    /// The AI path failed; only metadata repairs were kept
    Failed,
}

/// Result of processing one note
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub note: String,
    pub path: PathBuf,
    pub outcome: ProcessOutcome,
    pub dry_run: bool,
    pub fast: bool,
    /// Metadata repairs applied (or planned, in a dry run)
    pub repairs: Vec<FieldChange>,
    /// Tags after merging suggestions
    pub tags: Vec<String>,
    pub tags_added: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    pub connections: Vec<SimilarNote>,
    /// Status moved from `inbox` to `promoted`
    pub status_promoted: bool,
    /// The file was rewritten
    pub written: bool,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(note: &Note, dry_run: bool, fast: bool) -> Self {
        Self {
            note: note.file_name(),
            path: note.path.clone(),
            outcome: ProcessOutcome::Repaired,
            dry_run,
            fast,
            repairs: Vec::new(),
            tags: note.tags(),
            tags_added: Vec::new(),
            quality_score: None,
            summary: None,
            suggestions: Vec::new(),
            recommendation: None,
            connections: Vec::new(),
            status_promoted: false,
            written: false,
            warnings: Vec::new(),
            error: None,
        }
    }
}

/// Everything the AI path produced for one note
struct Enrichment {
    suggested_tags: Vec<String>,
    enhancement: Enhancement,
    connections: Vec<SimilarNote>,
    warnings: Vec<String>,
}

/// Processes Inbox notes against one language model
pub struct InboxProcessor<'a, M: ?Sized> {
    vault: &'a Vault,
    settings: ProcessingConfig,
    repair: MetadataRepair<'a>,
    gateway: QualityGateway<&'a M>,
    discovery: ConnectionDiscovery<&'a M>,
    corpus: RefCell<Option<BTreeMap<String, String>>>,
}

impl<'a, M: LanguageModel + ?Sized> InboxProcessor<'a, M> {
    pub fn new(vault: &'a Vault, model: &'a M) -> Result<Self> {
        let settings = vault.config().processing.clone();
        Ok(Self {
            vault,
            repair: MetadataRepair::new(vault)?,
            gateway: QualityGateway::new(model),
            discovery: ConnectionDiscovery::new(model, settings.connection_min_similarity),
            settings,
            corpus: RefCell::new(None),
        })
    }

    pub fn vault(&self) -> &Vault {
        self.vault
    }

    /// Process one note.
    ///
    /// `fast` skips every model call and only repairs metadata. `dry_run`
    /// computes the same result without writing. Model failures are
    /// reported in the result; only I/O failures are returned as errors.
    #[tracing::instrument(skip(self, path), fields(note = %crate::note::display_name(path)))]
    pub fn process_inbox_note(&self, path: &Path, dry_run: bool, fast: bool) -> Result<ProcessResult> {
        let mut note = Note::load(path)?;
        let mut result = ProcessResult::new(&note, dry_run, fast);

        let file_time = fs::metadata(path).ok().as_ref().and_then(file_timestamp);
        let in_inbox = self.vault.location_of(path) == Some(Location::Inbox);
        let (planned, repair_issues) = self.repair.plan(&note, file_time, in_inbox);
        // The inbox status default waits for a successful enrichment
        let (status_default, repairs): (Vec<_>, Vec<_>) = planned
            .into_iter()
            .partition(|change| change.reason == RepairReason::MissingStatus);
        apply_changes(&mut note, &repairs);
        let mut dirty = !repairs.is_empty();
        result.repairs = repairs;
        result.warnings.extend(repair_issues);

        if let AiProcessed::Invalid(value) = note.ai_processed() {
            result.warnings.push(format!(
                "{}: field 'ai_processed' is not a boolean: {:?}",
                result.note, value
            ));
        }

        if !fast {
            match self.enrich(&note) {
                Ok(enrichment) => {
                    apply_changes(&mut note, &status_default);
                    result.repairs.extend(status_default);
                    dirty |= self.apply_enrichment(&mut note, enrichment, &mut result);
                    result.outcome = ProcessOutcome::Enriched;
                }
                Err(e) => {
                    warn!(error = %e, "AI enrichment failed, status left unchanged");
                    result.outcome = ProcessOutcome::Failed;
                    result.error = Some(e.to_string());
                }
            }
        }

        if dirty && !dry_run {
            note.save()?;
            result.written = true;
            info!(outcome = ?result.outcome, "note processed");
        } else {
            debug!(outcome = ?result.outcome, dirty, dry_run, "note processed without write");
        }
        Ok(result)
    }

    fn enrich(&self, note: &Note) -> std::result::Result<Enrichment, EnrichmentError> {
        let suggested_tags = self.gateway.generate_tags(&note.body)?;
        let enhancement = self.gateway.enhance_note(&note.body)?;

        let mut warnings = Vec::new();
        let corpus = self.corpus_without(&note.file_name());
        let limit = self.settings.connection_limit;
        let connections = match self.discovery.find_similar_notes(&note.body, &corpus, limit) {
            Ok(found) => found,
            Err(e) => {
                warnings.push(format!(
                    "connection discovery failed ({}); used lexical similarity",
                    e
                ));
                lexical_similar_notes(
                    &note.body,
                    &corpus,
                    self.settings.connection_min_similarity,
                    limit,
                )
            }
        };

        Ok(Enrichment {
            suggested_tags,
            enhancement,
            connections,
            warnings,
        })
    }

    /// Write AI results into the header; returns whether anything changed
    fn apply_enrichment(
        &self,
        note: &mut Note,
        enrichment: Enrichment,
        result: &mut ProcessResult,
    ) -> bool {
        let fm = &mut note.frontmatter;
        let mut changed = false;

        let (tags, added) = merge_tags(&result.tags, &enrichment.suggested_tags, self.settings.max_tags);
        if !added.is_empty() {
            changed |= fm.set(keys::TAGS, tags.clone());
        }

        // The stored two-decimal value is the one promotion compares against
        let score = round_score(enrichment.enhancement.quality_score);
        let recommendation = Recommendation::from_score(
            score,
            self.settings.permanent_threshold,
            self.settings.fleeting_threshold,
        );
        changed |= fm.set(keys::QUALITY_SCORE, format!("{:.2}", score));
        if !enrichment.enhancement.summary.is_empty() {
            changed |= fm.set(keys::AI_SUMMARY, enrichment.enhancement.summary.as_str());
        }
        changed |= fm.set(keys::AI_PROCESSED, "true");
        changed |= fm.set(keys::TRIAGE_RECOMMENDATION, recommendation.as_str());

        if matches!(note.status(), Ok(Some(NoteStatus::Inbox))) {
            note.frontmatter
                .set(keys::STATUS, NoteStatus::Promoted.as_str());
            result.status_promoted = true;
            changed = true;
        }
        changed |= note.frontmatter.set(keys::PROCESSED_DATE, now_timestamp());

        result.tags = tags;
        result.tags_added = added;
        result.quality_score = Some(score);
        result.summary = Some(enrichment.enhancement.summary).filter(|s| !s.is_empty());
        result.suggestions = enrichment.enhancement.suggestions;
        result.recommendation = Some(recommendation);
        result.connections = enrichment.connections;
        result.warnings.extend(enrichment.warnings);
        changed
    }

    /// Bodies of every vault note except `exclude`, loaded once per processor
    fn corpus_without(&self, exclude: &str) -> BTreeMap<String, String> {
        let mut cached = self.corpus.borrow_mut();
        let corpus = cached.get_or_insert_with(|| self.load_corpus());
        corpus
            .iter()
            .filter(|(name, _)| name.as_str() != exclude)
            .map(|(name, body)| (name.clone(), body.clone()))
            .collect()
    }

    fn load_corpus(&self) -> BTreeMap<String, String> {
        let mut corpus = BTreeMap::new();
        for location in Location::ALL {
            let paths = match self.vault.list(location) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(?location, error = %e, "cannot list notes for connections");
                    continue;
                }
            };
            for path in paths {
                match Note::load(&path) {
                    Ok(note) => {
                        corpus.insert(note.file_name(), note.body);
                    }
                    Err(e) => debug!(error = %e, "skipping unreadable note in corpus"),
                }
            }
        }
        debug!(notes = corpus.len(), "connection corpus loaded");
        corpus
    }
}

fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Union of `existing` and `suggested`, existing first, capped at `max`.
///
/// Existing tags are never dropped; suggestions only fill free slots.
/// Returns the merged list and the tags that were added.
pub fn merge_tags(existing: &[String], suggested: &[String], max: usize) -> (Vec<String>, Vec<String>) {
    let mut merged: Vec<String> = existing.to_vec();
    let mut added = Vec::new();
    for tag in suggested {
        if merged.len() >= max {
            break;
        }
        if !merged.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            merged.push(tag.clone());
            added.push(tag.clone());
        }
    }
    (merged, added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use crate::llm::gateway::{ENHANCE_TASK, TAG_TASK};
    use crate::llm::ScriptedModel;
    use tempfile::tempdir;

    fn vault() -> (tempfile::TempDir, Vault) {
        let dir = tempdir().unwrap();
        let vault = Vault::init(dir.path(), VaultConfig::default()).unwrap();
        (dir, vault)
    }

    fn working_model() -> ScriptedModel {
        ScriptedModel::new()
            .with_response(TAG_TASK, "[\"learning\", \"memory\"]")
            .with_response(
                ENHANCE_TASK,
                "{\"quality_score\": 0.82, \"suggestions\": [\"Cite a source\"], \"summary\": \"Recall beats rereading.\"}",
            )
    }

    const NOTE: &str = "---\ntype: permanent\nstatus: inbox\ncreated: 2024-01-02 03:04\ntags: [memory]\n---\nActive recall beats rereading. See [[Testing Effect]].\n";

    #[test]
    fn test_merge_tags_union_and_cap() {
        let existing = vec!["a".to_string(), "b".to_string()];
        let suggested = vec!["B".to_string(), "c".to_string(), "d".to_string()];

        let (merged, added) = merge_tags(&existing, &suggested, 3);
        assert_eq!(merged, vec!["a", "b", "c"]);
        assert_eq!(added, vec!["c"]);

        let (merged, added) = merge_tags(&existing, &suggested, 1);
        assert_eq!(merged, vec!["a", "b"]);
        assert!(added.is_empty());
    }

    #[test]
    fn test_full_path_enriches_and_promotes() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("recall.md");
        fs::write(&path, NOTE).unwrap();
        let model = working_model();
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, false, false).unwrap();

        assert_eq!(result.outcome, ProcessOutcome::Enriched);
        assert!(result.status_promoted);
        assert!(result.written);
        assert_eq!(result.tags, vec!["memory", "learning"]);
        assert_eq!(result.tags_added, vec!["learning"]);
        assert_eq!(result.recommendation, Some(Recommendation::PromoteToPermanent));

        let note = Note::load(&path).unwrap();
        assert_eq!(note.status().unwrap(), Some(NoteStatus::Promoted));
        assert_eq!(note.quality_score().unwrap(), Some(0.82));
        assert_eq!(note.ai_processed(), AiProcessed::Flag(true));
        assert_eq!(note.frontmatter.get_str(keys::AI_SUMMARY), Some("Recall beats rereading."));
        assert!(note.frontmatter.contains_key(keys::PROCESSED_DATE));
        assert_eq!(note.body, "Active recall beats rereading. See [[Testing Effect]].\n");
    }

    #[test]
    fn test_reprocessing_does_not_duplicate_keys() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("recall.md");
        fs::write(&path, NOTE).unwrap();
        let model = working_model();
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        processor.process_inbox_note(&path, false, false).unwrap();
        let second = processor.process_inbox_note(&path, false, false).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(!second.status_promoted);
        assert_eq!(content.matches("processed_date:").count(), 1);
        assert_eq!(content.matches("tags:").count(), 1);
        assert!(content.contains("status: promoted\n"));
    }

    #[test]
    fn test_tag_failure_leaves_status() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("recall.md");
        fs::write(&path, NOTE).unwrap();
        let model = ScriptedModel::new().failing(TAG_TASK, EnrichmentError::Timeout(30));
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, false, false).unwrap();

        assert_eq!(result.outcome, ProcessOutcome::Failed);
        assert!(result.error.as_deref().unwrap().contains("timed out"));
        assert!(!result.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), NOTE);
    }

    const STATUSLESS: &str = "---\ntype: fleeting\ncreated: 2024-01-01 10:00\n---\nBody\n";

    #[test]
    fn test_fast_mode_does_not_add_status() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("bare.md");
        fs::write(&path, STATUSLESS).unwrap();
        let model = working_model();
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, false, true).unwrap();

        assert_eq!(result.outcome, ProcessOutcome::Repaired);
        assert!(result.repairs.is_empty());
        assert!(!result.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), STATUSLESS);
    }

    #[test]
    fn test_tag_failure_does_not_add_status() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("bare.md");
        let original = STATUSLESS.replace("2024-01-01 10:00", "{{date}}");
        fs::write(&path, &original).unwrap();
        let model = ScriptedModel::new().failing(TAG_TASK, EnrichmentError::Timeout(30));
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, false, false).unwrap();

        assert_eq!(result.outcome, ProcessOutcome::Failed);
        assert_eq!(result.repairs.len(), 1);
        assert_eq!(result.repairs[0].field, "created");
        let note = Note::load(&path).unwrap();
        assert!(!note.frontmatter.contains_key(keys::STATUS));
        assert!(crate::time::is_canonical(note.created().unwrap()));
    }

    #[test]
    fn test_statusless_inbox_note_is_promoted_on_success() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("bare.md");
        fs::write(&path, STATUSLESS).unwrap();
        let model = working_model();
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, false, false).unwrap();

        assert!(result.status_promoted);
        assert_eq!(result.repairs[0].reason, RepairReason::MissingStatus);
        let note = Note::load(&path).unwrap();
        assert_eq!(note.status().unwrap(), Some(NoteStatus::Promoted));
        assert_eq!(note.frontmatter.keys().filter(|k| *k == keys::STATUS).count(), 1);
    }

    #[test]
    fn test_stored_score_matches_recommendation() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("recall.md");
        fs::write(&path, NOTE).unwrap();
        let model = ScriptedModel::new()
            .with_response(TAG_TASK, "[]")
            .with_response(ENHANCE_TASK, "{\"quality_score\": 0.6999, \"suggestions\": [], \"summary\": \"\"}");
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, false, false).unwrap();

        assert_eq!(result.quality_score, Some(0.7));
        assert_eq!(result.recommendation, Some(Recommendation::PromoteToPermanent));
        assert_eq!(Note::load(&path).unwrap().quality_score().unwrap(), Some(0.7));
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.6999), 0.7);
        assert_eq!(round_score(0.694), 0.69);
        assert_eq!(round_score(1.0), 1.0);
    }

    #[test]
    fn test_connection_failure_falls_back_to_lexical() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("recall.md");
        fs::write(&path, NOTE).unwrap();
        fs::write(
            vault.dir(Location::Permanent).join("Testing Effect.md"),
            "---\ntype: permanent\nstatus: published\n---\nActive recall strengthens memory.\n",
        )
        .unwrap();
        let model = working_model().failing_embeddings(EnrichmentError::Http { status: 500 });
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, true, false).unwrap();

        assert_eq!(result.outcome, ProcessOutcome::Enriched);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("lexical"));
        assert_eq!(result.connections[0].filename, "Testing Effect.md");
    }

    #[test]
    fn test_fast_mode_never_calls_model_or_changes_status() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("quick.md");
        fs::write(&path, "---\ntype: fleeting\nstatus: inbox\ncreated: {{date}}\n---\nQuick thought\n").unwrap();
        let model = working_model();
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, false, true).unwrap();

        assert_eq!(result.outcome, ProcessOutcome::Repaired);
        assert_eq!(result.repairs.len(), 1);
        assert!(result.written);
        assert_eq!(model.calls().len(), 0);
        let note = Note::load(&path).unwrap();
        assert_eq!(note.status().unwrap(), Some(NoteStatus::Inbox));
        assert!(crate::time::is_canonical(note.created().unwrap()));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("recall.md");
        let original = NOTE.replace("created: 2024-01-02 03:04\n", "");
        fs::write(&path, &original).unwrap();
        let model = working_model();
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, true, false).unwrap();

        assert!(result.status_promoted);
        assert_eq!(result.repairs.len(), 1);
        assert!(!result.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_non_boolean_ai_processed_is_reported_and_rewritten() {
        let (_dir, vault) = vault();
        let path = vault.inbox_dir().join("odd.md");
        fs::write(
            &path,
            NOTE.replace("tags: [memory]\n", "tags: [memory]\nai_processed: \"no\"\n"),
        )
        .unwrap();
        let model = working_model();
        let processor = InboxProcessor::new(&vault, &model).unwrap();

        let result = processor.process_inbox_note(&path, false, false).unwrap();

        assert!(result.warnings.iter().any(|w| w.contains("ai_processed")));
        assert_eq!(Note::load(&path).unwrap().ai_processed(), AiProcessed::Flag(true));
    }
}
