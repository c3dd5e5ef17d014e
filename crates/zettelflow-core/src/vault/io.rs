//! File operations on vault notes
//!
//! Writes go through a sibling temp file that is persisted (renamed) over
//! the target, so a crash never leaves a half-written note behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Result, ZettelError};
use crate::note::display_name;

/// Write bytes to `path` atomically (temp file in the same directory + rename)
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    staged(path, data)?
        .persist(path)
        .map_err(|e| ZettelError::io_operation("replace", display_name(path), e.error))?;
    Ok(())
}

/// Like [`write_atomic`], but fails with `AlreadyExists` instead of
/// replacing a file already at `path`
pub fn write_atomic_new(path: &Path, data: &[u8]) -> Result<()> {
    staged(path, data)?.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            ZettelError::already_exists("destination note", path.display())
        } else {
            ZettelError::io_operation("create", display_name(path), e.error)
        }
    })?;
    Ok(())
}

/// Synced sibling temp file holding `data`
fn staged(path: &Path, data: &[u8]) -> Result<NamedTempFile> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".zettelflow-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| ZettelError::io_operation("create temp file for", display_name(path), e))?;

    tmp.write_all(data)
        .and_then(|_| tmp.as_file().sync_data())
        .map_err(|e| ZettelError::io_operation("write", display_name(path), e))?;
    Ok(tmp)
}

/// Move a note into `dest_dir`, writing `content` as its new text.
///
/// The destination is written atomically first; the source is removed only
/// after that succeeded. An existing destination file is never overwritten.
/// A crash between the two steps leaves both copies, never neither.
pub fn move_note(source: &Path, dest_dir: &Path, content: &str) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| ZettelError::invalid_value("note path", source.display()))?;
    let dest = dest_dir.join(file_name);

    if dest == source {
        write_atomic(&dest, content.as_bytes())?;
        return Ok(dest);
    }

    fs::create_dir_all(dest_dir)
        .map_err(|e| ZettelError::io_operation("create directory", dest_dir.display(), e))?;
    write_atomic_new(&dest, content.as_bytes())?;

    if let Err(e) = fs::remove_file(source) {
        // Roll back so the note exists exactly once
        if let Err(rollback) = fs::remove_file(&dest) {
            warn!(
                dest = %dest.display(),
                error = %rollback,
                "rollback failed, note now exists in two places"
            );
        }
        return Err(ZettelError::io_operation(
            "remove source",
            display_name(source),
            e,
        ));
    }

    Ok(dest)
}

/// Markdown files directly inside `dir`, sorted by file name.
///
/// Hidden files (including in-flight temp files) are skipped.
pub fn list_markdown(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            ZettelError::io_operation("list", dir.display(), e)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let markdown = path.extension().is_some_and(|ext| ext == "md");
        if markdown && !hidden {
            files.push(path.to_path_buf());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
