//! Local language model access
//!
//! The core consumes a model through the [`LanguageModel`] trait: text
//! generation, embeddings and a reachability probe. [`OllamaClient`] talks
//! to an Ollama-compatible HTTP endpoint; [`ScriptedModel`] is an
//! in-process stand-in for tests and offline runs.

pub mod gateway;
pub mod mock;
pub mod ollama;

use thiserror::Error;

pub use gateway::{Enhancement, QualityGateway};
pub use mock::ScriptedModel;
pub use ollama::OllamaClient;

/// Failures at the language model boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    #[error("language model unavailable: {0}")]
    Unavailable(String),

    #[error("language model request timed out after {0}s")]
    Timeout(u64),

    #[error("language model returned HTTP {status}")]
    Http { status: u16 },

    #[error("invalid language model response: {0}")]
    InvalidResponse(String),

    #[error("language model disabled by configuration")]
    Disabled,
}

/// A text generation and embedding backend
pub trait LanguageModel {
    /// Complete `prompt`, returning the raw model text
    fn generate(&self, prompt: &str) -> Result<String, EnrichmentError>;

    /// Embedding vector for `text`
    fn embed(&self, text: &str) -> Result<Vec<f32>, EnrichmentError>;

    /// Cheap reachability probe
    fn health_check(&self) -> bool;

    /// Model name for logs and reports
    fn name(&self) -> &str;
}

impl<T: LanguageModel + ?Sized> LanguageModel for &T {
    fn generate(&self, prompt: &str) -> Result<String, EnrichmentError> {
        (**self).generate(prompt)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        (**self).embed(text)
    }

    fn health_check(&self) -> bool {
        (**self).health_check()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    fn generate(&self, prompt: &str) -> Result<String, EnrichmentError> {
        (**self).generate(prompt)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        (**self).embed(text)
    }

    fn health_check(&self) -> bool {
        (**self).health_check()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Model that refuses every call, used when `[llm] enabled = false`
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledModel;

impl LanguageModel for DisabledModel {
    fn generate(&self, _prompt: &str) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Disabled)
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, EnrichmentError> {
        Err(EnrichmentError::Disabled)
    }

    fn health_check(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

/// Build the configured model backend
pub fn from_config(config: &crate::config::LlmConfig) -> Box<dyn LanguageModel> {
    if config.enabled {
        Box::new(OllamaClient::new(config))
    } else {
        Box::new(DisabledModel)
    }
}

/// Cosine similarity of two dense vectors, clamped to [0, 1]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}
