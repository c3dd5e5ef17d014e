//! Connection discovery: rank other notes by similarity to a note body
//!
//! The primary ranking uses embeddings from the language model. When the
//! embedding service fails the caller gets the [`EnrichmentError`] and may
//! fall back to [`lexical_similar_notes`], which needs no service.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use serde::Serialize;
use tracing::debug;

use crate::llm::{cosine_similarity, EnrichmentError, LanguageModel};
use crate::text::{sparse_cosine, term_frequencies};

/// A candidate link target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarNote {
    pub filename: String,
    /// Similarity in [0.0, 1.0]
    pub similarity: f64,
}

/// Embedding-based similarity search with a per-instance embedding cache
pub struct ConnectionDiscovery<M> {
    model: M,
    min_similarity: f64,
    cache: RefCell<HashMap<u64, Vec<f32>>>,
}

impl<M: LanguageModel> ConnectionDiscovery<M> {
    pub fn new(model: M, min_similarity: f64) -> Self {
        Self {
            model,
            min_similarity,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn embedding(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        let key = content_key(text);
        if let Some(hit) = self.cache.borrow().get(&key) {
            return Ok(hit.clone());
        }
        let vector = self.model.embed(text)?;
        self.cache.borrow_mut().insert(key, vector.clone());
        Ok(vector)
    }

    /// Notes of `corpus` (filename -> content) most similar to `body`,
    /// best first, at most `max` entries, each at or above the configured
    /// minimum similarity.
    pub fn find_similar_notes(
        &self,
        body: &str,
        corpus: &BTreeMap<String, String>,
        max: usize,
    ) -> Result<Vec<SimilarNote>, EnrichmentError> {
        if max == 0 || corpus.is_empty() || body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedding(body)?;
        let mut ranked = Vec::with_capacity(corpus.len());
        for (filename, content) in corpus {
            if content.trim().is_empty() {
                continue;
            }
            let similarity = cosine_similarity(&query, &self.embedding(content)?);
            ranked.push(SimilarNote {
                filename: filename.clone(),
                similarity,
            });
        }

        let results = rank(ranked, self.min_similarity, max);
        debug!(
            candidates = corpus.len(),
            found = results.len(),
            "embedding similarity search"
        );
        Ok(results)
    }
}

/// Service-free ranking by stemmed term-frequency cosine similarity
pub fn lexical_similar_notes(
    body: &str,
    corpus: &BTreeMap<String, String>,
    min_similarity: f64,
    max: usize,
) -> Vec<SimilarNote> {
    if max == 0 {
        return Vec::new();
    }
    let query = term_frequencies(body);
    let ranked = corpus
        .iter()
        .map(|(filename, content)| SimilarNote {
            filename: filename.clone(),
            similarity: sparse_cosine(&query, &term_frequencies(content)),
        })
        .collect();
    rank(ranked, min_similarity, max)
}

fn rank(mut notes: Vec<SimilarNote>, min_similarity: f64, max: usize) -> Vec<SimilarNote> {
    notes.retain(|n| n.similarity > 0.0 && n.similarity >= min_similarity);
    notes.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.filename.cmp(&b.filename))
    });
    notes.truncate(max);
    notes
}

fn content_key(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
