use super::similarity::{LevenshteinSimilarity, SimilarityScorer};
use crate::compatibility::domain::{CompatibilityRecord, DenyListEntry, KnowledgeBase};
use std::cmp::Ordering;

/// Default fuzzy acceptance threshold
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Matcher tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSettings {
    pub fuzzy_enabled: bool,
    /// A candidate is accepted only if its score is strictly greater
    pub fuzzy_threshold: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            fuzzy_enabled: true,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Tier that produced a match
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Alias,
    Fuzzy { score: f64, distance: usize },
}

/// Matcher output. `NoMatch` is a legitimate outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'kb> {
    Denied(&'kb DenyListEntry),
    Matched {
        record: &'kb CompatibilityRecord,
        kind: MatchKind,
        /// Record name, alias or fuzzy candidate that was hit
        matched_name: String,
    },
    NoMatch,
}

/// KnowledgeBaseMatcher - resolves a canonical name against a knowledge base
///
/// Tiers, first hit wins:
/// 1. deny list (name or alias)
/// 2. exact record name
/// 3. record alias
/// 4. fuzzy similarity over every record name and alias
///
/// Fuzzy ties go to the higher score, then the smaller edit distance, then
/// the alphabetically first candidate, so results are deterministic.
pub struct KnowledgeBaseMatcher {
    scorer: Box<dyn SimilarityScorer>,
    settings: MatchSettings,
}

impl KnowledgeBaseMatcher {
    pub fn new(settings: MatchSettings) -> Self {
        Self::with_scorer(settings, Box::new(LevenshteinSimilarity))
    }

    pub fn with_scorer(settings: MatchSettings, scorer: Box<dyn SimilarityScorer>) -> Self {
        Self { scorer, settings }
    }

    pub fn settings(&self) -> MatchSettings {
        self.settings
    }

    pub fn find<'kb>(&self, kb: &'kb KnowledgeBase, canonical: &str) -> MatchOutcome<'kb> {
        if canonical.is_empty() {
            return MatchOutcome::NoMatch;
        }

        if let Some(entry) = kb.denied(canonical) {
            return MatchOutcome::Denied(entry);
        }

        if let Some(record) = kb.find_by_name(canonical) {
            return MatchOutcome::Matched {
                record,
                kind: MatchKind::Exact,
                matched_name: record.name.clone(),
            };
        }

        if let Some(record) = kb.find_by_alias(canonical) {
            return MatchOutcome::Matched {
                record,
                kind: MatchKind::Alias,
                matched_name: canonical.to_string(),
            };
        }

        if self.settings.fuzzy_enabled {
            if let Some(outcome) = self.find_fuzzy(kb, canonical) {
                return outcome;
            }
        }

        MatchOutcome::NoMatch
    }

    fn find_fuzzy<'kb>(&self, kb: &'kb KnowledgeBase, canonical: &str) -> Option<MatchOutcome<'kb>> {
        let mut best: Option<(f64, usize, &str, usize)> = None;

        // Candidates are sorted by name, so keeping the first of equal
        // (score, distance) pairs keeps the alphabetically first one.
        for candidate in kb.fuzzy_candidates() {
            let score = self.scorer.score(canonical, &candidate.name);
            if score.is_nan() || score <= self.settings.fuzzy_threshold {
                continue;
            }
            let distance = self.scorer.distance(canonical, &candidate.name);

            let better = match best {
                None => true,
                Some((best_score, best_distance, _, _)) => {
                    match score.total_cmp(&best_score) {
                        Ordering::Greater => true,
                        Ordering::Equal => distance < best_distance,
                        Ordering::Less => false,
                    }
                }
            };
            if better {
                best = Some((score, distance, &candidate.name, candidate.record));
            }
        }

        let (score, distance, name, index) = best?;
        let record = kb.record(index)?;
        Some(MatchOutcome::Matched {
            record,
            kind: MatchKind::Fuzzy { score, distance },
            matched_name: name.to_string(),
        })
    }
}

impl Default for KnowledgeBaseMatcher {
    fn default() -> Self {
        Self::new(MatchSettings::default())
    }
}
