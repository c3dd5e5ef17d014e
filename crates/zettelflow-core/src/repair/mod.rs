//! Metadata repair engine
//!
//! Normalizes the lifecycle fields of Inbox notes so promotion can trust
//! them: fills in or fixes `created` from the file's timestamps, defaults
//! a missing `status` to `inbox`. A missing `type` is never guessed; it is
//! reported and left for promotion to reject.
//!
//! Only targeted keys are touched. Everything else in the header and the
//! entire body are written back unchanged. Running a repair twice is a
//! no-op the second time.

pub mod placeholders;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::note::{display_name, keys, Note, NoteStatus};
use crate::time::{file_timestamp, format_timestamp, is_canonical, TIMESTAMP_FORMAT};
use crate::vault::{Location, Vault};

pub use placeholders::PlaceholderPatterns;

/// Why a field was rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairReason {
    /// `created` was absent
    MissingCreated,
    /// `created` held an unprocessed template placeholder
    PlaceholderCreated,
    /// `created` was a recognised timestamp in a non-canonical format
    NormalizedCreated,
    /// Inbox note without `status`
    MissingStatus,
}

/// A single planned or applied field change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub reason: RepairReason,
}

/// Outcome of repairing one note
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairResult {
    pub note: String,
    /// Changes were required
    pub needed: bool,
    /// Changes were written to disk
    pub made: bool,
    pub changes: Vec<FieldChange>,
    /// Conditions repair cannot fix (missing type, unreadable file, ...)
    pub errors: Vec<String>,
}

/// Aggregate outcome of repairing a directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairSummary {
    pub execute: bool,
    pub notes_scanned: usize,
    pub repairs_needed: usize,
    pub repairs_made: usize,
    pub errors: Vec<String>,
    pub results: Vec<RepairResult>,
}

/// Repairs lifecycle metadata of notes in a vault
#[derive(Debug, Clone)]
pub struct MetadataRepair<'a> {
    vault: &'a Vault,
    placeholders: PlaceholderPatterns,
}

impl<'a> MetadataRepair<'a> {
    pub fn new(vault: &'a Vault) -> Result<Self> {
        let placeholders = PlaceholderPatterns::from_config(&vault.config().repair)?;
        Ok(Self {
            vault,
            placeholders,
        })
    }

    /// Compute the changes a note needs, without applying them.
    ///
    /// `file_time` is the creation-time oracle used when `created` must be
    /// rebuilt; `in_inbox` enables the `status` default.
    pub fn plan(
        &self,
        note: &Note,
        file_time: Option<DateTime<Local>>,
        in_inbox: bool,
    ) -> (Vec<FieldChange>, Vec<String>) {
        let mut changes = Vec::new();
        let mut errors = Vec::new();
        let name = note.file_name();

        let created_fix = match note.created() {
            None => Some((None, RepairReason::MissingCreated)),
            Some(value) if self.placeholders.matches(value) => {
                Some((Some(value.to_string()), RepairReason::PlaceholderCreated))
            }
            Some(value) if is_canonical(value) => None,
            Some(value) => match normalize_timestamp(value) {
                Some(normalized) => {
                    changes.push(FieldChange {
                        field: keys::CREATED.to_string(),
                        from: Some(value.to_string()),
                        to: normalized,
                        reason: RepairReason::NormalizedCreated,
                    });
                    None
                }
                None => {
                    errors.push(format!(
                        "{}: field 'created' has unrecognised timestamp {:?}",
                        name, value
                    ));
                    None
                }
            },
        };

        if let Some((from, reason)) = created_fix {
            match file_time {
                Some(time) => changes.push(FieldChange {
                    field: keys::CREATED.to_string(),
                    from,
                    to: format_timestamp(&time),
                    reason,
                }),
                None => errors.push(format!(
                    "{}: cannot determine file timestamp to repair field 'created'",
                    name
                )),
            }
        }

        if in_inbox && !note.frontmatter.contains_key(keys::STATUS) {
            changes.push(FieldChange {
                field: keys::STATUS.to_string(),
                from: None,
                to: NoteStatus::Inbox.to_string(),
                reason: RepairReason::MissingStatus,
            });
        }

        match note.note_type() {
            Ok(Some(_)) => {}
            Ok(None) => errors.push(format!("{}: missing required field 'type'", name)),
            Err(e) => errors.push(format!("{}: field 'type': {}", name, e)),
        }

        (changes, errors)
    }

    /// Plan and apply repairs to an in-memory note; returns the applied changes
    pub fn repair_in_memory(
        &self,
        note: &mut Note,
        file_time: Option<DateTime<Local>>,
        in_inbox: bool,
    ) -> (Vec<FieldChange>, Vec<String>) {
        let (changes, errors) = self.plan(note, file_time, in_inbox);
        apply_changes(note, &changes);
        (changes, errors)
    }

    /// Repair one note file.
    ///
    /// With `execute == false` nothing is written; the result describes what
    /// would change. Failures are reported in the result, never raised.
    #[tracing::instrument(skip(self, path), fields(note = %display_name(path)))]
    pub fn repair(&self, path: &Path, execute: bool) -> RepairResult {
        let mut result = RepairResult {
            note: display_name(path),
            ..Default::default()
        };

        let mut note = match Note::load(path) {
            Ok(note) => note,
            Err(e) => {
                warn!(error = %e, "unreadable note");
                result.errors.push(format!("{}: {}", result.note, e));
                return result;
            }
        };

        let file_time = fs::metadata(path).ok().as_ref().and_then(file_timestamp);
        let in_inbox = self.vault.location_of(path) == Some(Location::Inbox);

        let (changes, errors) = self.repair_in_memory(&mut note, file_time, in_inbox);
        result.needed = !changes.is_empty();
        result.changes = changes;
        result.errors = errors;

        if result.needed && execute {
            match note.save() {
                Ok(()) => {
                    result.made = true;
                    info!(changes = result.changes.len(), "repaired note metadata");
                }
                Err(e) => {
                    warn!(error = %e, "failed to write repaired note");
                    result.errors.push(format!("{}: {}", result.note, e));
                }
            }
        } else if result.needed {
            debug!(changes = result.changes.len(), "repair needed (dry run)");
        }

        result
    }

    /// Repair every Markdown note directly inside `dir`
    pub fn repair_dir(&self, dir: &Path, execute: bool) -> Result<RepairSummary> {
        let files = crate::vault::io::list_markdown(dir)?;
        let mut summary = RepairSummary {
            execute,
            ..Default::default()
        };

        for path in files {
            let result = self.repair(&path, execute);
            summary.notes_scanned += 1;
            if result.needed {
                summary.repairs_needed += 1;
            }
            if result.made {
                summary.repairs_made += 1;
            }
            summary.errors.extend(result.errors.iter().cloned());
            summary.results.push(result);
        }

        info!(
            scanned = summary.notes_scanned,
            needed = summary.repairs_needed,
            made = summary.repairs_made,
            errors = summary.errors.len(),
            "metadata repair finished"
        );
        Ok(summary)
    }

    /// Repair every note in the Inbox
    pub fn repair_all(&self, execute: bool) -> Result<RepairSummary> {
        let inbox = self.vault.require_inbox()?;
        self.repair_dir(&inbox, execute)
    }
}

/// Apply planned changes to a note's frontmatter
pub fn apply_changes(note: &mut Note, changes: &[FieldChange]) {
    for change in changes {
        note.frontmatter.set(&change.field, change.to.as_str());
    }
}

/// Convert recognised non-canonical timestamps to `YYYY-MM-DD HH:MM`
fn normalize_timestamp(value: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.format(TIMESTAMP_FORMAT).to_string());
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.format(TIMESTAMP_FORMAT).to_string());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn vault() -> (tempfile::TempDir, Vault) {
        let dir = tempdir().unwrap();
        let vault = Vault::init(dir.path(), VaultConfig::default()).unwrap();
        (dir, vault)
    }

    fn fixed_time() -> Option<DateTime<Local>> {
        Some(Local.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap())
    }

    #[test]
    fn test_plan_placeholder_created() {
        let (_dir, vault) = vault();
        let repair = MetadataRepair::new(&vault).unwrap();
        let note = Note::parse(
            "---\ntype: fleeting\nstatus: inbox\ncreated: {{date:YYYY-MM-DD HH:mm}}\n---\nBody\n",
            vault.inbox_dir().join("a.md"),
        );

        let (changes, errors) = repair.plan(&note, fixed_time(), true);

        assert!(errors.is_empty());
        assert_eq!(
            changes,
            vec![FieldChange {
                field: "created".to_string(),
                from: Some("{{date:YYYY-MM-DD HH:mm}}".to_string()),
                to: "2024-03-01 10:15".to_string(),
                reason: RepairReason::PlaceholderCreated,
            }]
        );
    }

    #[test]
    fn test_plan_missing_status_only_in_inbox() {
        let (_dir, vault) = vault();
        let repair = MetadataRepair::new(&vault).unwrap();
        let note = Note::parse(
            "---\ntype: permanent\ncreated: 2024-01-01 09:00\n---\n",
            vault.inbox_dir().join("a.md"),
        );

        let (in_inbox, _) = repair.plan(&note, fixed_time(), true);
        let (elsewhere, _) = repair.plan(&note, fixed_time(), false);

        assert_eq!(in_inbox.len(), 1);
        assert_eq!(in_inbox[0].reason, RepairReason::MissingStatus);
        assert_eq!(in_inbox[0].to, "inbox");
        assert!(elsewhere.is_empty());
    }

    #[test]
    fn test_plan_missing_type_is_reported_not_guessed() {
        let (_dir, vault) = vault();
        let repair = MetadataRepair::new(&vault).unwrap();
        let note = Note::parse(
            "---\nstatus: inbox\ncreated: 2024-01-01 09:00\n---\n",
            vault.inbox_dir().join("untyped.md"),
        );

        let (changes, errors) = repair.plan(&note, fixed_time(), true);

        assert!(changes.is_empty());
        assert_eq!(errors, vec!["untyped.md: missing required field 'type'"]);
    }

    #[test]
    fn test_plan_normalizes_iso_created() {
        let (_dir, vault) = vault();
        let repair = MetadataRepair::new(&vault).unwrap();
        let note = Note::parse(
            "---\ntype: fleeting\nstatus: inbox\ncreated: 2024-05-06T07:08:09\n---\n",
            vault.inbox_dir().join("a.md"),
        );

        let (changes, _) = repair.plan(&note, fixed_time(), true);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to, "2024-05-06 07:08");
        assert_eq!(changes[0].reason, RepairReason::NormalizedCreated);
    }

    #[test]
    fn test_plan_unrecognised_created_is_error() {
        let (_dir, vault) = vault();
        let repair = MetadataRepair::new(&vault).unwrap();
        let note = Note::parse(
            "---\ntype: fleeting\nstatus: inbox\ncreated: last tuesday\n---\n",
            vault.inbox_dir().join("a.md"),
        );

        let (changes, errors) = repair.plan(&note, fixed_time(), true);

        assert!(changes.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("created"));
    }

    #[test]
    fn test_repair_dry_run_does_not_write() {
        let (_dir, vault) = vault();
        let repair = MetadataRepair::new(&vault).unwrap();
        let path = vault.inbox_dir().join("a.md");
        let original = "---\ntype: fleeting\ncreated: {{date}}\n---\nBody\n";
        fs::write(&path, original).unwrap();

        let result = repair.repair(&path, false);

        assert!(result.needed);
        assert!(!result.made);
        assert_eq!(result.changes.len(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_repair_execute_is_idempotent() {
        let (_dir, vault) = vault();
        let repair = MetadataRepair::new(&vault).unwrap();
        let path = vault.inbox_dir().join("a.md");
        fs::write(
            &path,
            "---\ntype: fleeting\ncreated: <% tp.file.creation_date() %>\nextra: keep\n---\nBody [[Link]]\n",
        )
        .unwrap();

        let first = repair.repair(&path, true);
        let after_first = fs::read_to_string(&path).unwrap();
        let second = repair.repair(&path, true);
        let after_second = fs::read_to_string(&path).unwrap();

        assert!(first.needed && first.made);
        assert!(!second.needed && !second.made);
        assert_eq!(after_first, after_second);
        assert!(after_first.contains("extra: keep\n"));
        assert!(after_first.contains("status: inbox\n"));
        assert!(after_first.ends_with("---\nBody [[Link]]\n"));

        let note = Note::load(&path).unwrap();
        assert!(is_canonical(note.created().unwrap()));
    }

    #[test]
    fn test_repair_all_requires_inbox() {
        let dir = tempdir().unwrap();
        let vault = Vault::open(dir.path(), VaultConfig::default()).unwrap();
        let repair = MetadataRepair::new(&vault).unwrap();
        assert!(repair.repair_all(false).is_err());
    }

    #[test]
    fn test_normalize_timestamp_variants() {
        assert_eq!(
            normalize_timestamp("2024-03-01T10:15:00+00:00").as_deref(),
            Some("2024-03-01 10:15")
        );
        assert_eq!(
            normalize_timestamp("2024-03-01 10:15:59").as_deref(),
            Some("2024-03-01 10:15")
        );
        assert_eq!(
            normalize_timestamp("2024-03-01").as_deref(),
            Some("2024-03-01 00:00")
        );
        assert_eq!(normalize_timestamp("03/01/2024"), None);
    }
}
