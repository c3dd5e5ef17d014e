//! Path resolution utilities for CLI commands

use std::env;
use std::path::{Path, PathBuf};

/// Resolve the vault root.
///
/// An explicit `--vault` (or `ZETTELFLOW_VAULT`) wins; otherwise the
/// current working directory, or "." if that cannot be determined.
pub fn resolve_vault_path(vault: Option<&Path>) -> PathBuf {
    match vault {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Resolve a note argument: existing paths are used as given, bare file
/// names are looked up in the Inbox.
pub fn resolve_note_path(arg: &Path, inbox: &Path) -> PathBuf {
    if arg.exists() || arg.components().count() > 1 {
        return arg.to_path_buf();
    }
    let candidate = inbox.join(arg);
    if candidate.extension().is_none() {
        candidate.with_extension("md")
    } else {
        candidate
    }
}
