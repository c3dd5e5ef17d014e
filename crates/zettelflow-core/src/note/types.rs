use crate::error::{Result, ZettelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Note type, stored in the `type` frontmatter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    /// Quick capture, low ceremony, meant to be refined later
    Fleeting,
    /// Notes derived from external sources (URLs, books, papers)
    Literature,
    /// Distilled insights in the author's own words
    Permanent,
}

impl NoteType {
    /// All valid note types
    pub const VALID_TYPES: &'static [&'static str] = &["fleeting", "literature", "permanent"];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Fleeting => "fleeting",
            NoteType::Literature => "literature",
            NoteType::Permanent => "permanent",
        }
    }
}

impl FromStr for NoteType {
    type Err = ZettelError;

    /// Case-sensitive: `Permanent` is not a valid type.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fleeting" => Ok(NoteType::Fleeting),
            "literature" => Ok(NoteType::Literature),
            "permanent" => Ok(NoteType::Permanent),
            other => Err(ZettelError::invalid_value(
                "note type",
                format!("{} (expected: {})", other, Self::VALID_TYPES.join(", ")),
            )),
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle stage, stored in the `status` frontmatter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    /// Captured, not yet processed
    Inbox,
    /// Being worked on by the author
    Draft,
    /// Processed and ready to leave the Inbox
    Promoted,
    /// Moved into the permanent corpus
    Published,
}

impl NoteStatus {
    pub const VALID_STATUSES: &'static [&'static str] = &["inbox", "draft", "promoted", "published"];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Inbox => "inbox",
            NoteStatus::Draft => "draft",
            NoteStatus::Promoted => "promoted",
            NoteStatus::Published => "published",
        }
    }
}

impl FromStr for NoteStatus {
    type Err = ZettelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inbox" => Ok(NoteStatus::Inbox),
            "draft" => Ok(NoteStatus::Draft),
            "promoted" => Ok(NoteStatus::Promoted),
            "published" => Ok(NoteStatus::Published),
            other => Err(ZettelError::invalid_value(
                "note status",
                format!(
                    "{} (expected: {})",
                    other,
                    Self::VALID_STATUSES.join(", ")
                ),
            )),
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triage recommendation derived from an AI quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    PromoteToPermanent,
    MoveToFleeting,
    ImproveOrArchive,
}

impl Recommendation {
    /// Bucket a quality score; both thresholds are inclusive lower bounds.
    pub fn from_score(score: f64, permanent_threshold: f64, fleeting_threshold: f64) -> Self {
        if score >= permanent_threshold {
            Recommendation::PromoteToPermanent
        } else if score >= fleeting_threshold {
            Recommendation::MoveToFleeting
        } else {
            Recommendation::ImproveOrArchive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::PromoteToPermanent => "promote_to_permanent",
            Recommendation::MoveToFleeting => "move_to_fleeting",
            Recommendation::ImproveOrArchive => "improve_or_archive",
        }
    }
}

impl FromStr for Recommendation {
    type Err = ZettelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "promote_to_permanent" => Ok(Recommendation::PromoteToPermanent),
            "move_to_fleeting" => Ok(Recommendation::MoveToFleeting),
            "improve_or_archive" => Ok(Recommendation::ImproveOrArchive),
            other => Err(ZettelError::invalid_value("recommendation", other)),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
