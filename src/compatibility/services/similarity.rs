//! String similarity used by the fuzzy tier of the matcher.
//!
//! The matcher depends on the [`SimilarityScorer`] trait only, so the
//! algorithm can be swapped or scripted in tests.

use strsim::{levenshtein, normalized_levenshtein};

/// Pure name-similarity function
pub trait SimilarityScorer: Send + Sync {
    /// Similarity in `[0, 1]`, 1 meaning identical
    fn score(&self, a: &str, b: &str) -> f64;

    /// Edit distance, used to break score ties
    fn distance(&self, a: &str, b: &str) -> usize;
}

/// Normalized Levenshtein similarity
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinSimilarity;

impl SimilarityScorer for LevenshteinSimilarity {
    fn score(&self, a: &str, b: &str) -> f64 {
        normalized_levenshtein(a, b)
    }

    fn distance(&self, a: &str, b: &str) -> usize {
        levenshtein(a, b)
    }
}
