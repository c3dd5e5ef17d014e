//! Configuration type definitions

use serde::{Deserialize, Serialize};

/// Vault configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Directory names under the vault root
    #[serde(default)]
    pub directories: DirectoryConfig,

    /// Local LLM service settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Auto-promotion settings
    #[serde(default)]
    pub promotion: PromotionConfig,

    /// Inbox processing settings
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Metadata repair settings
    #[serde(default)]
    pub repair: RepairConfig,

    /// Reporting settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Names of the four lifecycle directories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_inbox_dir")]
    pub inbox: String,
    #[serde(default = "default_fleeting_dir")]
    pub fleeting: String,
    #[serde(default = "default_literature_dir")]
    pub literature: String,
    #[serde(default = "default_permanent_dir")]
    pub permanent: String,
}

/// Connection settings for the local LLM service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Disable every LLM call (processing behaves as if the service is down)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the Ollama-compatible endpoint
    #[serde(default = "default_llm_url")]
    pub base_url: String,

    /// Generation model
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Embedding model
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// Auto-promotion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionConfig {
    /// Minimum `quality_score` (inclusive) for auto-promotion
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
}

/// Inbox enrichment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Maximum number of tags kept after merging AI suggestions
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,

    /// Maximum suggested connections per note
    #[serde(default = "default_connection_limit")]
    pub connection_limit: usize,

    /// Minimum similarity for a suggested connection
    #[serde(default = "default_connection_min_similarity")]
    pub connection_min_similarity: f64,

    /// Score at or above which a note is recommended for the permanent corpus
    #[serde(default = "default_permanent_threshold")]
    pub permanent_threshold: f64,

    /// Score at or above which a note is recommended as fleeting
    #[serde(default = "default_fleeting_threshold")]
    pub fleeting_threshold: f64,
}

/// Metadata repair settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Regexes matching unprocessed template placeholders in `created`
    #[serde(default = "default_placeholder_patterns")]
    pub placeholder_patterns: Vec<String>,
}

/// Reporting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Inbox notes older than this are reported as stale
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,
}

fn default_true() -> bool {
    true
}

fn default_inbox_dir() -> String {
    "Inbox".to_string()
}

fn default_fleeting_dir() -> String {
    "Fleeting Notes".to_string()
}

fn default_literature_dir() -> String {
    "Literature Notes".to_string()
}

fn default_permanent_dir() -> String {
    "Permanent Notes".to_string()
}

fn default_llm_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3:8b".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_quality_threshold() -> f64 {
    0.7
}

fn default_max_tags() -> usize {
    8
}

fn default_connection_limit() -> usize {
    5
}

fn default_connection_min_similarity() -> f64 {
    0.3
}

fn default_permanent_threshold() -> f64 {
    0.7
}

fn default_fleeting_threshold() -> f64 {
    0.4
}

fn default_stale_after_days() -> i64 {
    30
}

/// Known placeholder shapes left behind by note templates
pub fn default_placeholder_patterns() -> Vec<String> {
    vec![
        r"\{\{\s*date\s*:[^}]*\}\}".to_string(),
        r"\{\{\s*date\s*\}\}".to_string(),
        r"<%\s*tp\.date\.now\([^)]*\)\s*%>".to_string(),
        r"<%\s*tp\.file\.creation_date\([^)]*\)\s*%>".to_string(),
    ]
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            inbox: default_inbox_dir(),
            fleeting: default_fleeting_dir(),
            literature: default_literature_dir(),
            permanent: default_permanent_dir(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_llm_url(),
            model: default_llm_model(),
            embed_model: default_embed_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_tags: default_max_tags(),
            connection_limit: default_connection_limit(),
            connection_min_similarity: default_connection_min_similarity(),
            permanent_threshold: default_permanent_threshold(),
            fleeting_threshold: default_fleeting_threshold(),
        }
    }
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            placeholder_patterns: default_placeholder_patterns(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
        }
    }
}
