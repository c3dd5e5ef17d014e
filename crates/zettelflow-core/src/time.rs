//! Timestamp helpers for the canonical `YYYY-MM-DD HH:MM` format

use std::fs::Metadata;
use std::sync::OnceLock;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};
use regex::Regex;

/// Canonical timestamp format used for `created`, `promoted_date`, `processed_date`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

static CANONICAL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn canonical_re() -> Option<&'static Regex> {
    CANONICAL_RE
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}$").ok())
        .as_ref()
}

/// Format a local datetime as `YYYY-MM-DD HH:MM`
pub fn format_timestamp(dt: &DateTime<Local>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time at minute granularity
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Whether a value matches the canonical format exactly
pub fn is_canonical(value: &str) -> bool {
    canonical_re().is_some_and(|re| re.is_match(value))
}

/// Parse a canonical timestamp
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if !is_canonical(value) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

/// Best-effort creation time of a file.
///
/// Birth time where the platform records it, falling back to mtime. A birth
/// time later than the mtime means the file was copied or restored with its
/// mtime preserved, so the earlier of the two wins.
pub fn file_timestamp(metadata: &Metadata) -> Option<DateTime<Local>> {
    let time: SystemTime = match (metadata.created().ok(), metadata.modified().ok()) {
        (Some(born), Some(modified)) => born.min(modified),
        (born, modified) => born.or(modified)?,
    };
    Some(DateTime::<Local>::from(time))
}
