//! Vault analytics for the `status` command

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::llm::LanguageModel;
use crate::note::{AiProcessed, Note};
use crate::time::{file_timestamp, parse_timestamp};
use crate::vault::{Location, Vault};

/// Note count of one vault directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryCount {
    pub location: Location,
    pub path: PathBuf,
    pub notes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleNote {
    pub note: String,
    pub age_days: i64,
}

/// A note whose directory disagrees with its `(type, status)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMismatch {
    pub note: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Location>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Productivity {
    pub created_last_7_days: usize,
    pub created_last_30_days: usize,
    pub scored_notes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_quality: Option<f64>,
    pub ai_processed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmHealth {
    pub model: String,
    pub available: bool,
}

/// Snapshot of the vault
#[derive(Debug, Clone, Serialize)]
pub struct VaultStatus {
    pub vault: PathBuf,
    pub total_notes: usize,
    pub directories: Vec<DirectoryCount>,
    /// Inbox notes per `status` value (`missing` when absent)
    pub inbox_by_status: BTreeMap<String, usize>,
    pub promotion_candidates: usize,
    pub orphans: Vec<String>,
    pub stale: Vec<StaleNote>,
    pub productivity: Productivity,
    pub location_mismatches: Vec<LocationMismatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmHealth>,
    pub warnings: Vec<String>,
}

impl VaultStatus {
    /// Probe the language model and record its availability
    pub fn with_llm_health<M: LanguageModel + ?Sized>(mut self, model: &M) -> Self {
        self.llm = Some(LlmHealth {
            model: model.name().to_string(),
            available: model.health_check(),
        });
        self
    }
}

struct LoadedNote {
    note: Note,
    location: Location,
    created: Option<NaiveDateTime>,
}

/// Collect analytics for every note in the vault as of `now`
#[tracing::instrument(skip(vault, now), fields(root = %vault.root().display()))]
pub fn vault_status(vault: &Vault, now: DateTime<Local>) -> Result<VaultStatus> {
    let mut status = VaultStatus {
        vault: vault.root().to_path_buf(),
        total_notes: 0,
        directories: Vec::new(),
        inbox_by_status: BTreeMap::new(),
        promotion_candidates: 0,
        orphans: Vec::new(),
        stale: Vec::new(),
        productivity: Productivity::default(),
        location_mismatches: Vec::new(),
        llm: None,
        warnings: Vec::new(),
    };

    let mut notes = Vec::new();
    for location in Location::ALL {
        let paths = vault.list(location)?;
        status.directories.push(DirectoryCount {
            location,
            path: vault.dir(location),
            notes: paths.len(),
        });
        for path in paths {
            match Note::load(&path) {
                Ok(note) => {
                    let created = note.created().and_then(parse_timestamp).or_else(|| {
                        fs::metadata(&path)
                            .ok()
                            .as_ref()
                            .and_then(file_timestamp)
                            .map(|t| t.naive_local())
                    });
                    notes.push(LoadedNote {
                        note,
                        location,
                        created,
                    });
                }
                Err(e) => status.warnings.push(e.to_string()),
            }
        }
    }
    status.total_notes = status.directories.iter().map(|d| d.notes).sum();

    let stale_after = vault.config().report.stale_after_days;
    let now = now.naive_local();
    let mut quality_sum = 0.0;

    for loaded in &notes {
        let note = &loaded.note;
        let name = note.file_name();
        let age_days = loaded.created.map(|c| (now - c).num_days());

        if loaded.location == Location::Inbox {
            let key = note
                .frontmatter
                .get_str(crate::note::keys::STATUS)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "missing".to_string());
            if key == "promoted" {
                status.promotion_candidates += 1;
            }
            *status.inbox_by_status.entry(key).or_insert(0) += 1;

            if let Some(age) = age_days.filter(|age| *age > stale_after) {
                status.stale.push(StaleNote {
                    note: name.clone(),
                    age_days: age,
                });
            }
        }

        if let Some(age) = age_days {
            if (0..7).contains(&age) {
                status.productivity.created_last_7_days += 1;
            }
            if (0..30).contains(&age) {
                status.productivity.created_last_30_days += 1;
            }
        }

        match note.quality_score() {
            Ok(Some(score)) => {
                status.productivity.scored_notes += 1;
                quality_sum += score;
            }
            Ok(None) => {}
            Err(e) => status.warnings.push(format!("{}: {}", name, e)),
        }
        if note.ai_processed() == AiProcessed::Flag(true) {
            status.productivity.ai_processed += 1;
        }

        if let Some(mismatch) = location_mismatch(loaded) {
            status.location_mismatches.push(mismatch);
        }
    }

    if status.productivity.scored_notes > 0 {
        status.productivity.average_quality =
            Some(quality_sum / status.productivity.scored_notes as f64);
    }
    status.orphans = find_orphans(&notes);
    status.stale.sort_by(|a, b| b.age_days.cmp(&a.age_days).then(a.note.cmp(&b.note)));

    debug!(
        notes = status.total_notes,
        orphans = status.orphans.len(),
        mismatches = status.location_mismatches.len(),
        "vault status collected"
    );
    Ok(status)
}

fn location_mismatch(loaded: &LoadedNote) -> Option<LocationMismatch> {
    let note = &loaded.note;
    let mismatch = |expected: Option<Location>, reason: String| LocationMismatch {
        note: note.file_name(),
        location: loaded.location,
        expected,
        reason,
    };

    let note_type = match note.note_type() {
        Ok(t) => t,
        Err(e) => return Some(mismatch(None, e.to_string())),
    };
    let note_status = match note.status() {
        Ok(s) => s,
        Err(e) => return Some(mismatch(None, e.to_string())),
    };

    if loaded.location.accepts(note_type, note_status) {
        return None;
    }
    let expected = Location::expected(note_type, note_status);
    let reason = match (note_type, note_status) {
        (None, Some(s)) => format!("status '{}' without a type", s),
        (t, s) => format!(
            "type '{}' with status '{}'",
            t.map(|t| t.as_str()).unwrap_or("missing"),
            s.map(|s| s.as_str()).unwrap_or("missing")
        ),
    };
    Some(mismatch(expected, reason))
}

/// Link target normalised to a note stem
fn link_stem(target: &str) -> String {
    let last = target.rsplit('/').next().unwrap_or(target).trim();
    last.strip_suffix(".md").unwrap_or(last).to_string()
}

/// Notes without outgoing links that no other note links to
fn find_orphans(notes: &[LoadedNote]) -> Vec<String> {
    let mut linked: HashSet<String> = HashSet::new();
    for loaded in notes {
        let own = loaded.note.stem();
        for target in loaded.note.wiki_links() {
            let stem = link_stem(&target);
            if stem != own {
                linked.insert(stem);
            }
        }
    }

    let mut orphans: Vec<String> = notes
        .iter()
        .filter(|l| l.note.wiki_links().is_empty() && !linked.contains(&l.note.stem()))
        .map(|l| l.note.file_name())
        .collect();
    orphans.sort();
    orphans
}
