//! Progress lines for batch runs

use std::io::{self, Write};
use std::time::Instant;

use crate::text::truncate_chars;

/// Longest file name shown before truncation
const MAX_NAME_CHARS: usize = 40;

/// Writes `[current/total] pct% - name...` lines to a diagnostic stream
pub struct ProgressReporter<W: Write> {
    out: W,
    enabled: bool,
    started: Option<Instant>,
}

impl ProgressReporter<io::Stderr> {
    pub fn stderr(enabled: bool) -> Self {
        Self::new(io::stderr(), enabled)
    }
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W, enabled: bool) -> Self {
        Self {
            out,
            enabled,
            started: None,
        }
    }

    /// Report that item `current` (1-based) of `total` is starting
    pub fn update(&mut self, current: usize, total: usize, name: &str) {
        if !self.enabled || total == 0 {
            return;
        }
        self.started.get_or_insert_with(Instant::now);
        let _ = writeln!(self.out, "{}", format_line(current, total, name));
    }

    /// Final line with elapsed time
    pub fn finish(&mut self, processed: usize) {
        if !self.enabled {
            return;
        }
        if let Some(started) = self.started {
            let _ = writeln!(
                self.out,
                "Processed {} notes in {:.1}s",
                processed,
                started.elapsed().as_secs_f64()
            );
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `[3/10] 30% - some-long-note-name...`
pub fn format_line(current: usize, total: usize, name: &str) -> String {
    let percent = if total == 0 {
        100
    } else {
        current * 100 / total
    };
    format!(
        "[{}/{}] {}% - {}",
        current,
        total,
        percent,
        truncate_chars(name, MAX_NAME_CHARS)
    )
}
