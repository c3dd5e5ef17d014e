//! Detection of unprocessed template placeholders

use regex::RegexSet;

use crate::config::RepairConfig;
use crate::error::{Result, ZettelError};

/// Compiled allow-list of placeholder patterns
#[derive(Debug, Clone)]
pub struct PlaceholderPatterns {
    set: RegexSet,
}

impl PlaceholderPatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = RegexSet::new(patterns).map_err(|e| ZettelError::InvalidConfig {
            reason: format!("placeholder patterns: {}", e),
        })?;
        Ok(Self { set })
    }

    pub fn from_config(config: &RepairConfig) -> Result<Self> {
        Self::new(&config.placeholder_patterns)
    }

    /// Whether the value contains any known placeholder
    pub fn matches(&self, value: &str) -> bool {
        self.set.is_match(value)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
