//! End-to-end lifecycle tests against real temporary vaults

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Local, TimeZone};
use tempfile::{tempdir, TempDir};
use walkdir::WalkDir;

use zettelflow_core::config::VaultConfig;
use zettelflow_core::llm::gateway::{ENHANCE_TASK, TAG_TASK};
use zettelflow_core::llm::{EnrichmentError, ScriptedModel};
use zettelflow_core::note::{Note, NoteStatus, NoteType, Recommendation};
use zettelflow_core::process::{InboxProcessor, ProcessOutcome};
use zettelflow_core::promote::PromotionEngine;
use zettelflow_core::repair::MetadataRepair;
use zettelflow_core::vault::{Location, Vault};

fn new_vault() -> (TempDir, Vault) {
    let dir = tempdir().unwrap();
    let vault = Vault::init(dir.path(), VaultConfig::default()).unwrap();
    (dir, vault)
}

fn write_note(vault: &Vault, location: Location, name: &str, content: &str) -> PathBuf {
    let path = vault.dir(location).join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Every file under the vault root with its bytes
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| (e.path().to_path_buf(), fs::read(e.path()).unwrap()))
        .collect()
}

fn scripted_model() -> ScriptedModel {
    ScriptedModel::new()
        .with_response(TAG_TASK, "[\"evergreen\", \"zettelkasten\"]")
        .with_response(
            ENHANCE_TASK,
            "{\"quality_score\": 0.75, \"suggestions\": [], \"summary\": \"Atomic notes compound.\"}",
        )
}

#[test]
fn placeholder_repair_uses_file_time_and_is_idempotent() {
    let (_dir, vault) = new_vault();
    let path = write_note(
        &vault,
        Location::Inbox,
        "capture.md",
        "---\ntype: fleeting\nstatus: inbox\ncreated: {{date:YYYY-MM-DD HH:mm}}\nsource: phone\n---\nBody with ![[sketch.png]] and ![x](Media/x.png)\n",
    );
    let mtime = Local.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap();
    File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(SystemTime::from(mtime))
        .unwrap();

    let repair = MetadataRepair::new(&vault).unwrap();
    let first = repair.repair_all(true).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let second = repair.repair_all(true).unwrap();

    assert_eq!(first.repairs_made, 1);
    assert_eq!(
        content,
        "---\ntype: fleeting\nstatus: inbox\ncreated: 2024-03-01 10:15\nsource: phone\n---\nBody with ![[sketch.png]] and ![x](Media/x.png)\n"
    );
    assert_eq!(second.repairs_needed, 0);
    assert_eq!(second.repairs_made, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn missing_type_blocks_promotion() {
    let (_dir, vault) = new_vault();
    write_note(
        &vault,
        Location::Inbox,
        "untyped.md",
        "---\nstatus: promoted\nquality_score: 0.9\n---\nGood idea\n",
    );

    let report = PromotionEngine::new(&vault)
        .auto_promote_ready_notes(true, 0.7)
        .unwrap();

    assert_eq!(report.error_count, 1);
    assert!(report.errors[0].error.contains("type"));
}

#[test]
fn batch_mixed_quality() {
    let (_dir, vault) = new_vault();
    for (name, score) in [("high.md", 0.85), ("mid.md", 0.55), ("low.md", 0.25)] {
        write_note(
            &vault,
            Location::Inbox,
            name,
            &format!("---\ntype: permanent\nstatus: promoted\nquality_score: {}\n---\n{}\n", score, name),
        );
    }

    let report = PromotionEngine::new(&vault)
        .auto_promote_ready_notes(false, 0.7)
        .unwrap();

    assert_eq!(report.total_candidates, 3);
    assert_eq!(report.promoted_count, 1);
    assert_eq!(report.skipped_count, 2);
    assert_eq!(report.by_type.get("permanent"), Some(&1));
    assert_eq!(report.promoted[0].note, "high.md");
}

#[test]
fn routing_preserves_other_fields_and_body() {
    let (_dir, vault) = new_vault();
    let cases = [
        (NoteType::Fleeting, Location::Fleeting),
        (NoteType::Literature, Location::Literature),
        (NoteType::Permanent, Location::Permanent),
    ];
    for (note_type, _) in cases {
        write_note(
            &vault,
            Location::Inbox,
            &format!("{}.md", note_type),
            &format!(
                "---\ntype: {}\nstatus: promoted\ncreated: 2024-01-01 08:00\ntags: [a, b]\nquality_score: 0.7\nsource: \"Book: Title\"\n---\n# Heading\n\nText [[Other]] ![[img.png]]\n",
                note_type
            ),
        );
    }

    let report = PromotionEngine::new(&vault)
        .auto_promote_ready_notes(false, 0.7)
        .unwrap();
    assert_eq!(report.promoted_count, 3);

    for (note_type, location) in cases {
        let name = format!("{}.md", note_type);
        let source = vault.inbox_dir().join(&name);
        let target = vault.dir(location).join(&name);
        assert!(!source.exists());
        let note = Note::load(&target).unwrap();
        assert_eq!(note.status().unwrap(), Some(NoteStatus::Published));
        assert_eq!(note.created(), Some("2024-01-01 08:00"));
        assert_eq!(note.tags(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(note.frontmatter.get_str("source"), Some("Book: Title"));
        assert!(note.frontmatter.contains_key("promoted_date"));
        assert_eq!(note.body, "# Heading\n\nText [[Other]] ![[img.png]]\n");
        let raw = fs::read_to_string(&target).unwrap();
        assert!(raw.contains("source: \"Book: Title\"\n"));
    }
}

#[test]
fn published_notes_are_not_candidates_again() {
    let (_dir, vault) = new_vault();
    write_note(
        &vault,
        Location::Inbox,
        "once.md",
        "---\ntype: literature\nstatus: promoted\nquality_score: 0.9\n---\nx\n",
    );
    let engine = PromotionEngine::new(&vault);

    engine.auto_promote_ready_notes(false, 0.7).unwrap();
    let before = snapshot(vault.root());
    let again = engine.auto_promote_ready_notes(false, 0.7).unwrap();

    assert_eq!(again.total_candidates, 0);
    assert_eq!(snapshot(vault.root()), before);
}

#[test]
fn dry_runs_never_touch_the_vault() {
    let (_dir, vault) = new_vault();
    write_note(
        &vault,
        Location::Inbox,
        "a.md",
        "---\ntype: fleeting\ncreated: <% tp.date.now(\"YYYY-MM-DD\") %>\n---\nA\n",
    );
    write_note(
        &vault,
        Location::Inbox,
        "b.md",
        "---\ntype: permanent\nstatus: promoted\nquality_score: 0.95\n---\nB\n",
    );
    let before = snapshot(vault.root());

    let repair = MetadataRepair::new(&vault).unwrap().repair_all(false).unwrap();
    let model = scripted_model();
    let processor = InboxProcessor::new(&vault, &model).unwrap();
    let batch = processor.batch_process_inbox(true, false).unwrap();
    let promote = PromotionEngine::new(&vault)
        .auto_promote_ready_notes(true, 0.7)
        .unwrap();

    assert_eq!(repair.repairs_needed, 2);
    assert_eq!(batch.processed, 2);
    assert_eq!(promote.would_promote_count, 1);
    assert_eq!(snapshot(vault.root()), before);
}

#[test]
fn fast_path_never_promotes() {
    let (_dir, vault) = new_vault();
    let path = write_note(
        &vault,
        Location::Inbox,
        "quick.md",
        "---\ntype: permanent\nstatus: inbox\nquality_score: 0.99\n---\nExcellent\n",
    );
    let model = scripted_model();
    let processor = InboxProcessor::new(&vault, &model).unwrap();

    let result = processor.process_inbox_note(&path, false, true).unwrap();

    assert_eq!(result.outcome, ProcessOutcome::Repaired);
    assert!(!result.status_promoted);
    let note = Note::load(&path).unwrap();
    assert_eq!(note.status().unwrap(), Some(NoteStatus::Inbox));
    assert!(!note.frontmatter.contains_key("processed_date"));
}

#[test]
fn ai_failure_leaves_status_untouched() {
    let (_dir, vault) = new_vault();
    let path = write_note(
        &vault,
        Location::Inbox,
        "idea.md",
        "---\ntype: permanent\nstatus: inbox\ncreated: 2024-05-05 05:05\n---\nIdea\n",
    );
    let model = ScriptedModel::new()
        .failing(TAG_TASK, EnrichmentError::Unavailable("connection refused".into()));
    let processor = InboxProcessor::new(&vault, &model).unwrap();

    let result = processor.process_inbox_note(&path, false, false).unwrap();

    assert_eq!(result.outcome, ProcessOutcome::Failed);
    let note = Note::load(&path).unwrap();
    assert_eq!(note.status().unwrap(), Some(NoteStatus::Inbox));
    assert!(!note.frontmatter.contains_key("processed_date"));
    assert!(!note.frontmatter.contains_key("quality_score"));
}

#[test]
fn statusless_note_keeps_missing_status_without_enrichment() {
    let (_dir, vault) = new_vault();
    let content = "---\ntype: fleeting\ncreated: 2024-01-01 10:00\n---\nBody\n";
    let fast = write_note(&vault, Location::Inbox, "fast.md", content);
    let failed = write_note(&vault, Location::Inbox, "failed.md", content);

    let model = scripted_model();
    InboxProcessor::new(&vault, &model)
        .unwrap()
        .process_inbox_note(&fast, false, true)
        .unwrap();

    let broken = ScriptedModel::new().failing(TAG_TASK, EnrichmentError::Timeout(30));
    let result = InboxProcessor::new(&vault, &broken)
        .unwrap()
        .process_inbox_note(&failed, false, false)
        .unwrap();

    assert_eq!(result.outcome, ProcessOutcome::Failed);
    assert_eq!(fs::read_to_string(&fast).unwrap(), content);
    assert_eq!(fs::read_to_string(&failed).unwrap(), content);
}

#[test]
fn processed_score_and_auto_promotion_agree_at_threshold() {
    let (_dir, vault) = new_vault();
    let cases = [("above.md", "0.6999"), ("below.md", "0.6949")];

    let mut recommendations = BTreeMap::new();
    for (name, score) in cases {
        let path = write_note(
            &vault,
            Location::Inbox,
            name,
            "---\ntype: permanent\nstatus: inbox\ncreated: 2024-01-01 10:00\n---\nClaim\n",
        );
        let model = ScriptedModel::new().with_response(TAG_TASK, "[]").with_response(
            ENHANCE_TASK,
            format!("{{\"quality_score\": {}, \"suggestions\": [], \"summary\": \"\"}}", score),
        );
        let result = InboxProcessor::new(&vault, &model)
            .unwrap()
            .process_inbox_note(&path, false, false)
            .unwrap();
        recommendations.insert(name, result.recommendation.unwrap());
    }

    let report = PromotionEngine::new(&vault)
        .auto_promote_ready_notes(false, 0.7)
        .unwrap();

    assert_eq!(recommendations["above.md"], Recommendation::PromoteToPermanent);
    assert_eq!(recommendations["below.md"], Recommendation::MoveToFleeting);
    assert_eq!(report.promoted_count, 1);
    assert_eq!(report.promoted[0].note, "above.md");
    assert!(vault.dir(Location::Permanent).join("above.md").is_file());
    assert!(vault.inbox_dir().join("below.md").is_file());
}

#[test]
fn full_lifecycle_from_capture_to_published() {
    let (_dir, vault) = new_vault();
    write_note(
        &vault,
        Location::Inbox,
        "atomic.md",
        "---\ntype: permanent\ncreated: {{date}}\n---\nAtomic notes compound over time.\n",
    );

    let model = scripted_model();
    let processor = InboxProcessor::new(&vault, &model).unwrap();
    let batch = processor.batch_process_inbox(false, false).unwrap();
    assert_eq!(batch.processed, 1);
    assert_eq!(batch.summary.promote_to_permanent, 1);

    let rerun = processor.batch_process_inbox(false, false).unwrap();
    assert_eq!(rerun.skipped, 1);
    assert_eq!(rerun.processed, 0);

    let report = PromotionEngine::new(&vault)
        .auto_promote_ready_notes(false, 0.7)
        .unwrap();
    assert_eq!(report.promoted_count, 1);

    let note = Note::load(&vault.dir(Location::Permanent).join("atomic.md")).unwrap();
    assert_eq!(note.status().unwrap(), Some(NoteStatus::Published));
    assert_eq!(
        note.tags(),
        vec!["evergreen".to_string(), "zettelkasten".to_string()]
    );
    assert_eq!(note.body, "Atomic notes compound over time.\n");
}
