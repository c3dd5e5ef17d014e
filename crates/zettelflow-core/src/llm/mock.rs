//! Scripted in-process language model
//!
//! Replies are chosen by the first registered marker that occurs in the
//! prompt. Embeddings are deterministic hashed bags of stemmed words, so
//! texts sharing vocabulary get similar vectors.
//!
//! ```
//! use zettelflow_core::llm::{gateway, LanguageModel, ScriptedModel};
//!
//! let model = ScriptedModel::new().with_response(gateway::TAG_TASK, "[\"rust\"]");
//! assert_eq!(model.generate(gateway::TAG_TASK).unwrap(), "[\"rust\"]");
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{EnrichmentError, LanguageModel};
use crate::text::stemmed_tokens;

const EMBEDDING_DIMENSION: usize = 256;

#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: &'static str,
    pub input: String,
}

#[derive(Debug)]
struct Script {
    replies: Vec<(String, Result<String, EnrichmentError>)>,
    default_reply: Result<String, EnrichmentError>,
    embed_failure: Option<EnrichmentError>,
    healthy: bool,
    calls: Vec<MockCall>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            replies: Vec::new(),
            default_reply: Ok(String::new()),
            embed_failure: None,
            healthy: true,
            calls: Vec::new(),
        }
    }
}

/// Language model driven by a fixed script
#[derive(Debug, Clone, Default)]
pub struct ScriptedModel {
    script: Arc<Mutex<Script>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A poisoned script only means another test thread panicked
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reply with `response` to prompts containing `marker`
    pub fn with_response(self, marker: impl Into<String>, response: impl Into<String>) -> Self {
        self.script()
            .replies
            .push((marker.into(), Ok(response.into())));
        self
    }

    /// Fail prompts containing `marker`
    pub fn failing(self, marker: impl Into<String>, error: EnrichmentError) -> Self {
        self.script().replies.push((marker.into(), Err(error)));
        self
    }

    /// Reply for prompts matching no marker
    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        self.script().default_reply = Ok(response.into());
        self
    }

    /// Fail every embedding request
    pub fn failing_embeddings(self, error: EnrichmentError) -> Self {
        self.script().embed_failure = Some(error);
        self
    }

    /// Report the service as unreachable and fail every call
    pub fn unavailable(self) -> Self {
        {
            let mut script = self.script();
            script.healthy = false;
            let error = EnrichmentError::Unavailable("scripted outage".to_string());
            script.default_reply = Err(error.clone());
            script.embed_failure = Some(error);
        }
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.script().calls.clone()
    }

    pub fn generate_call_count(&self) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|c| c.operation == "generate")
            .count()
    }

    pub fn embed_call_count(&self) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|c| c.operation == "embed")
            .count()
    }
}

impl LanguageModel for ScriptedModel {
    fn generate(&self, prompt: &str) -> Result<String, EnrichmentError> {
        let mut script = self.script();
        script.calls.push(MockCall {
            operation: "generate",
            input: prompt.to_string(),
        });
        if !script.healthy {
            return script.default_reply.clone();
        }
        script
            .replies
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| script.default_reply.clone())
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        let mut script = self.script();
        script.calls.push(MockCall {
            operation: "embed",
            input: text.to_string(),
        });
        if let Some(error) = &script.embed_failure {
            return Err(error.clone());
        }
        Ok(hashed_embedding(text))
    }

    fn health_check(&self) -> bool {
        self.script().healthy
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Deterministic bag-of-words embedding
pub fn hashed_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIMENSION];
    for token in stemmed_tokens(text) {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let bucket = (hasher.finish() % EMBEDDING_DIMENSION as u64) as usize;
        vector[bucket] += 1.0;
    }
    vector
}
