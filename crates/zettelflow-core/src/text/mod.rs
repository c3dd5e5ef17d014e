//! Text processing utilities for tokenization and lexical similarity

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Common English stop words to filter out during tokenization
static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Porter stemmer for English text
static STEMMER: OnceLock<Stemmer> = OnceLock::new();

fn get_stop_words() -> &'static HashSet<&'static str> {
    STOP_WORDS.get_or_init(|| {
        [
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have",
            "i", "if", "in", "into", "is", "it", "its", "my", "no", "not", "of", "on", "or",
            "so", "such", "that", "the", "their", "then", "there", "these", "they", "this",
            "to", "was", "we", "were", "will", "with", "you",
        ]
        .iter()
        .copied()
        .collect()
    })
}

fn get_stemmer() -> &'static Stemmer {
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Lowercase word tokens split on non-alphanumerics, stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    let stop_words = get_stop_words();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .filter(|s| !stop_words.contains(s))
        .map(|s| s.to_string())
        .collect()
}

/// Tokenize and reduce each token to its Porter stem
pub fn stemmed_tokens(text: &str) -> Vec<String> {
    let stemmer = get_stemmer();
    tokenize(text)
        .iter()
        .map(|t| stemmer.stem(t).to_string())
        .collect()
}

/// Term-frequency vector of stemmed tokens
pub fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let mut tf = HashMap::new();
    for token in stemmed_tokens(text) {
        *tf.entry(token).or_insert(0.0) += 1.0;
    }
    tf
}

/// Cosine similarity of two sparse term vectors, in [0, 1]
pub fn sparse_cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, x)| large.get(term).map(|y| x * y))
        .sum();
    let norm_a: f64 = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Shorten `text` to at most `max_chars` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
