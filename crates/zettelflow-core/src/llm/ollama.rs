//! Blocking client for an Ollama-compatible HTTP endpoint

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ureq::Agent;

use super::{EnrichmentError, LanguageModel};
use crate::config::LlmConfig;

/// Generation slower than this is logged as a warning
const SLOW_GENERATION_MS: u128 = 20_000;

/// Ollama client over `/api/generate`, `/api/embed` and `/api/tags`
#[derive(Clone)]
pub struct OllamaClient {
    agent: Agent,
    base_url: String,
    model: String,
    embed_model: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();
        Self {
            agent: Agent::new_with_config(agent_config),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            embed_model: config.embed_model.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn map_error(&self, error: ureq::Error) -> EnrichmentError {
        match error {
            ureq::Error::StatusCode(status) => EnrichmentError::Http { status },
            ureq::Error::Timeout(_) => EnrichmentError::Timeout(self.timeout_secs),
            ureq::Error::Json(e) => EnrichmentError::InvalidResponse(e.to_string()),
            ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                EnrichmentError::Timeout(self.timeout_secs)
            }
            other => EnrichmentError::Unavailable(format!("{}: {}", self.base_url, other)),
        }
    }
}

impl LanguageModel for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, EnrichmentError> {
        let start = Instant::now();
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let mut response = self
            .agent
            .post(&self.endpoint("generate"))
            .send_json(&request)
            .map_err(|e| self.map_error(e))?;
        let body: GenerateResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| self.map_error(e))?;

        let elapsed = start.elapsed().as_millis();
        debug!(model = %self.model, duration_ms = elapsed, "generation complete");
        if elapsed > SLOW_GENERATION_MS {
            warn!(
                model = %self.model,
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                "slow generation"
            );
        }
        Ok(body.response)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        let request = EmbeddingRequest {
            model: &self.embed_model,
            input: text,
        };

        let mut response = self
            .agent
            .post(&self.endpoint("embed"))
            .send_json(&request)
            .map_err(|e| self.map_error(e))?;
        let body: EmbeddingResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| self.map_error(e))?;

        body.embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| EnrichmentError::InvalidResponse("empty embedding".to_string()))
    }

    fn health_check(&self) -> bool {
        match self.agent.get(&self.endpoint("tags")).call() {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, url = %self.base_url, "health check failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}
