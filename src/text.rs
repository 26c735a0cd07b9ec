//! Shared text utilities: whitespace tokenization, Jaccard similarity, and
//! keyword extraction. Used by both the equivalents aligner (`equivalents.rs`,
//! spec §4.E) and the estoppel keyword check (`elements.rs`, spec §4.F) so
//! the two modules don't each grow their own slightly-different tokenizer.

use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    "that", "this", "with", "from", "have", "which", "into", "such", "also", "been", "were",
    "their", "than", "then", "being", "each", "about", "there", "where", "when", "does", "over",
];

/// Lowercase, whitespace-tokenize, stripping simple surrounding punctuation.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Jaccard similarity between the token sets of two strings.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let ta: HashSet<String> = tokenize(a).into_iter().collect();
    let tb: HashSet<String> = tokenize(b).into_iter().collect();
    if ta.is_empty() && tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Tokens of length >= 4, minus a small stop-word list — used by the
/// estoppel keyword-overlap check (spec §4.F).
pub fn keywords(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|w| w.len() >= 4 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Fraction of `keywords(needle)` that appear as tokens of `haystack`.
pub fn keyword_overlap_ratio(needle: &str, haystack: &str) -> f64 {
    let kws = keywords(needle);
    if kws.is_empty() {
        return 0.0;
    }
    let hay_tokens: HashSet<String> = tokenize(haystack).into_iter().collect();
    let hits = kws.iter().filter(|k| hay_tokens.contains(*k)).count();
    hits as f64 / kws.len() as f64
}
