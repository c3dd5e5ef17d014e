//! Vault management for zettelflow
//!
//! The vault is a root directory holding four sibling note directories:
//! Inbox, Fleeting Notes, Literature Notes and Permanent Notes. There is no
//! database; the filesystem is the store.

pub mod io;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::VaultConfig;
use crate::error::{Result, ZettelError};
use crate::note::{NoteStatus, NoteType};

/// Logical location of a note inside the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Inbox,
    Fleeting,
    Literature,
    Permanent,
}

impl Location {
    pub const ALL: [Location; 4] = [
        Location::Inbox,
        Location::Fleeting,
        Location::Literature,
        Location::Permanent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Inbox => "inbox",
            Location::Fleeting => "fleeting",
            Location::Literature => "literature",
            Location::Permanent => "permanent",
        }
    }

    /// Routing target for a note type
    pub fn for_type(note_type: NoteType) -> Self {
        match note_type {
            NoteType::Fleeting => Location::Fleeting,
            NoteType::Literature => Location::Literature,
            NoteType::Permanent => Location::Permanent,
        }
    }

    /// The directory a note belongs in given its `(type, status)` pair.
    ///
    /// `inbox`/`draft` (or no status) map to the Inbox; `promoted` and
    /// `published` map to the directory of the note's type. Without a type
    /// a promoted or published note has no valid location.
    pub fn expected(note_type: Option<NoteType>, status: Option<NoteStatus>) -> Option<Self> {
        match status {
            None | Some(NoteStatus::Inbox) | Some(NoteStatus::Draft) => Some(Location::Inbox),
            Some(NoteStatus::Promoted) | Some(NoteStatus::Published) => {
                note_type.map(Location::for_type)
            }
        }
    }

    /// Whether a note with `(type, status)` may live here.
    ///
    /// Besides its expected directory, a `promoted` note may still sit in
    /// the Inbox: that is the auto-promotion candidate state.
    pub fn accepts(self, note_type: Option<NoteType>, status: Option<NoteStatus>) -> bool {
        if self == Location::Inbox && status == Some(NoteStatus::Promoted) {
            return true;
        }
        Location::expected(note_type, status) == Some(self)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vault rooted at a directory
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    config: VaultConfig,
}

impl Vault {
    /// Open an existing vault
    #[tracing::instrument(skip(root, config), fields(root = %root.display()))]
    pub fn open(root: &Path, config: VaultConfig) -> Result<Self> {
        if !root.is_dir() {
            return Err(ZettelError::VaultNotFound {
                path: root.to_path_buf(),
            });
        }
        Ok(Vault {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Create the vault directories (idempotent)
    pub fn init(root: &Path, config: VaultConfig) -> Result<Self> {
        fs::create_dir_all(root)
            .map_err(|e| ZettelError::io_operation("create vault", root.display(), e))?;
        let vault = Vault {
            root: root.to_path_buf(),
            config,
        };
        for location in Location::ALL {
            let dir = vault.dir(location);
            fs::create_dir_all(&dir)
                .map_err(|e| ZettelError::io_operation("create directory", dir.display(), e))?;
        }
        Ok(vault)
    }

    /// Get the vault root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the config
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Directory for a location
    pub fn dir(&self, location: Location) -> PathBuf {
        let dirs = &self.config.directories;
        let name = match location {
            Location::Inbox => &dirs.inbox,
            Location::Fleeting => &dirs.fleeting,
            Location::Literature => &dirs.literature,
            Location::Permanent => &dirs.permanent,
        };
        self.root.join(name)
    }

    /// Get the Inbox directory
    pub fn inbox_dir(&self) -> PathBuf {
        self.dir(Location::Inbox)
    }

    /// The Inbox directory, or `InboxNotFound` if it is missing
    pub fn require_inbox(&self) -> Result<PathBuf> {
        let inbox = self.inbox_dir();
        if !inbox.is_dir() {
            return Err(ZettelError::InboxNotFound { path: inbox });
        }
        Ok(inbox)
    }

    /// Markdown notes directly inside a location (missing directory = none)
    pub fn list(&self, location: Location) -> Result<Vec<PathBuf>> {
        let dir = self.dir(location);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        io::list_markdown(&dir)
    }

    /// Locate a note by file name (with or without `.md`), Inbox first
    pub fn find_note(&self, name: &str) -> Result<PathBuf> {
        let candidate = Path::new(name);
        if candidate.is_absolute() || candidate.components().count() > 1 {
            let resolved = if candidate.is_absolute() {
                candidate.to_path_buf()
            } else {
                self.root.join(candidate)
            };
            if resolved.is_file() {
                return Ok(resolved);
            }
        }

        let file_name = if name.ends_with(".md") {
            name.to_string()
        } else {
            format!("{}.md", name)
        };

        Location::ALL
            .iter()
            .map(|location| self.dir(*location).join(&file_name))
            .find(|path| path.is_file())
            .ok_or_else(|| ZettelError::not_found(name))
    }

    /// Which location a path lives in, if any
    pub fn location_of(&self, path: &Path) -> Option<Location> {
        let parent = path.parent()?;
        Location::ALL
            .into_iter()
            .find(|location| self.dir(*location) == parent)
    }
}
