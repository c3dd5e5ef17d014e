//! Quality gateway: tag suggestions, quality scoring and summaries
//!
//! Thin adapter that turns a note body into prompts and parses the model's
//! replies. Every failure comes back as an [`EnrichmentError`]; nothing
//! here touches the filesystem.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EnrichmentError, LanguageModel};
use crate::text::truncate_chars;

/// First line of the tag suggestion prompt
pub const TAG_TASK: &str = "TASK: suggest-tags";

/// First line of the quality assessment prompt
pub const ENHANCE_TASK: &str = "TASK: assess-note";

/// Note text beyond this is not sent to the model
const MAX_PROMPT_BODY_CHARS: usize = 6000;

/// Longest tag accepted from a model reply
const MAX_TAG_CHARS: usize = 40;

/// Result of a quality assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enhancement {
    /// Quality in [0.0, 1.0]
    pub quality_score: f64,
    pub suggestions: Vec<String>,
    pub summary: String,
}

#[derive(Deserialize)]
struct RawEnhancement {
    quality_score: f64,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    summary: String,
}

/// Gateway over a [`LanguageModel`]
pub struct QualityGateway<M> {
    model: M,
}

impl<M: LanguageModel> QualityGateway<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Suggested tags for a note body; an empty list means "no suggestions"
    pub fn generate_tags(&self, body: &str) -> Result<Vec<String>, EnrichmentError> {
        let prompt = format!(
            "{}\nSuggest up to 8 short topical tags for the note below. \
             Reply with a JSON array of lowercase strings and nothing else.\n\nNOTE:\n{}",
            TAG_TASK,
            truncate_chars(body, MAX_PROMPT_BODY_CHARS)
        );
        let reply = self.model.generate(&prompt)?;
        let tags = parse_tags(&reply);
        debug!(count = tags.len(), "tag suggestions parsed");
        Ok(tags)
    }

    /// Quality score, improvement suggestions and a one-paragraph summary
    pub fn enhance_note(&self, body: &str) -> Result<Enhancement, EnrichmentError> {
        let prompt = format!(
            "{}\nRate the note below as a Zettelkasten note. Reply with a JSON object \
             {{\"quality_score\": <number 0.0-1.0>, \"suggestions\": [<strings>], \
             \"summary\": <one or two sentences>}} and nothing else.\n\nNOTE:\n{}",
            ENHANCE_TASK,
            truncate_chars(body, MAX_PROMPT_BODY_CHARS)
        );
        let reply = self.model.generate(&prompt)?;
        parse_enhancement(&reply)
    }

    pub fn health_check(&self) -> bool {
        self.model.health_check()
    }
}

/// Extract tags from a model reply.
///
/// Accepts a JSON array anywhere in the text, otherwise a comma or newline
/// separated list. Tags are lowercased, `#`-stripped and hyphenated.
pub fn parse_tags(reply: &str) -> Vec<String> {
    let candidates: Vec<String> = json_slice(reply, '[', ']')
        .and_then(|slice| serde_json::from_str::<Vec<String>>(slice).ok())
        .unwrap_or_else(|| {
            reply
                .split([',', '\n'])
                .map(str::to_string)
                .collect()
        });

    let mut tags: Vec<String> = Vec::new();
    for candidate in candidates {
        if let Some(tag) = normalize_tag(&candidate) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_start_matches(['-', '*'])
        .trim()
        .trim_matches(['"', '\'', '`', '[', ']'])
        .trim_start_matches('#');
    let tag: String = trimmed
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '/'))
        .collect();

    if tag.is_empty() || tag.chars().count() > MAX_TAG_CHARS {
        None
    } else {
        Some(tag)
    }
}

/// Parse an assessment reply; the score must be a number in [0, 1]
pub fn parse_enhancement(reply: &str) -> Result<Enhancement, EnrichmentError> {
    let slice = json_slice(reply, '{', '}')
        .ok_or_else(|| EnrichmentError::InvalidResponse("no JSON object in reply".to_string()))?;
    let raw: RawEnhancement = serde_json::from_str(slice)
        .map_err(|e| EnrichmentError::InvalidResponse(e.to_string()))?;

    if !raw.quality_score.is_finite() || !(0.0..=1.0).contains(&raw.quality_score) {
        return Err(EnrichmentError::InvalidResponse(format!(
            "quality_score {} outside 0.0-1.0",
            raw.quality_score
        )));
    }

    Ok(Enhancement {
        quality_score: raw.quality_score,
        suggestions: raw
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        summary: raw.summary.trim().to_string(),
    })
}

/// Outermost `open`..`close` span of a reply, if any
fn json_slice(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
