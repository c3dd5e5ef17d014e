//! Vault configuration for zettelflow
//!
//! Configuration is read from `<vault>/.zettelflow.toml`, falling back to
//! `~/.config/zettelflow/config.toml`, falling back to built-in defaults.
//! The resolved [`VaultConfig`] is passed explicitly into every component.

pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::bail_invalid;
use crate::error::{Result, ZettelError};

pub use types::{
    default_placeholder_patterns, DirectoryConfig, LlmConfig, ProcessingConfig, PromotionConfig,
    RepairConfig, ReportConfig, VaultConfig,
};

/// Per-vault config file name
pub const VAULT_CONFIG_FILE: &str = ".zettelflow.toml";

const GLOBAL_CONFIG_DIR: &str = "zettelflow";
const GLOBAL_CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "ZETTELFLOW_CONFIG_DIR";

impl VaultConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ZettelError::io_operation("read config", path.display(), e))?;
        let config: VaultConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ZettelError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the effective configuration for a vault.
    ///
    /// An explicit path must exist. Otherwise the vault file, then the global
    /// file are tried; if neither exists the defaults apply. Environment
    /// overrides are layered on top in every case.
    #[tracing::instrument(skip(explicit), fields(vault = %vault_root.display()))]
    pub fn resolve(vault_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let vault_file = vault_root.join(VAULT_CONFIG_FILE);
                let global = global_config_path().filter(|p| p.is_file());
                if vault_file.is_file() {
                    Self::load(&vault_file)?
                } else if let Some(global) = global {
                    Self::load(&global)?
                } else {
                    tracing::debug!("no config file found, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `ZETTELFLOW_LLM_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ZETTELFLOW_LLM_URL") {
            if !url.is_empty() {
                self.llm.base_url = url;
            }
        }

        if let Ok(model) = std::env::var("ZETTELFLOW_LLM_MODEL") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }

        if let Ok(timeout) = std::env::var("ZETTELFLOW_LLM_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                self.llm.timeout_secs = seconds.clamp(1, 600);
            }
        }
    }

    /// Check value ranges and compile the placeholder patterns
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("promotion.quality_threshold", self.promotion.quality_threshold),
            (
                "processing.permanent_threshold",
                self.processing.permanent_threshold,
            ),
            (
                "processing.fleeting_threshold",
                self.processing.fleeting_threshold,
            ),
            (
                "processing.connection_min_similarity",
                self.processing.connection_min_similarity,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail_invalid!(name, format!("{} (expected 0.0..=1.0)", value));
            }
        }

        if self.processing.fleeting_threshold > self.processing.permanent_threshold {
            return Err(ZettelError::InvalidConfig {
                reason: "processing.fleeting_threshold exceeds processing.permanent_threshold"
                    .to_string(),
            });
        }

        if self.processing.max_tags == 0 {
            bail_invalid!("processing.max_tags", 0);
        }

        for pattern in &self.repair.placeholder_patterns {
            Regex::new(pattern).map_err(|e| ZettelError::InvalidConfig {
                reason: format!("placeholder pattern {:?}: {}", pattern, e),
            })?;
        }

        Ok(())
    }
}

/// Location of the per-user config file
pub fn global_config_path() -> Option<PathBuf> {
    let config_dir = match std::env::var(CONFIG_DIR_ENV_VAR) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()?.join(GLOBAL_CONFIG_DIR),
    };
    Some(config_dir.join(GLOBAL_CONFIG_FILE))
}
