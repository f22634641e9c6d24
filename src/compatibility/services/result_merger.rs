use crate::compatibility::domain::{AnalysisResult, ComponentKey, ResultSource};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// ResultMerger - combines partial result sets by component identity
///
/// For each (ecosystem, name, version) key the preferred result is kept:
/// higher confidence first, then a runtime result over a static one. The
/// remaining fields only break exact ties, so the choice is a maximum under
/// a total order. That makes merging commutative, associative and
/// idempotent: feeding the same set twice changes nothing.
#[derive(Debug, Default)]
pub struct ResultMerger {
    merged: BTreeMap<ComponentKey, AnalysisResult>,
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: AnalysisResult) {
        match self.merged.get_mut(&result.key) {
            Some(existing) => {
                if preference(&result, existing) == Ordering::Greater {
                    *existing = result;
                }
            }
            None => {
                self.merged.insert(result.key.clone(), result);
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = AnalysisResult>>(&mut self, results: I) {
        for result in results {
            self.add(result);
        }
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    /// Merged results sorted by component key
    pub fn into_results(self) -> Vec<AnalysisResult> {
        self.merged.into_values().collect()
    }

    /// Convenience: merge any number of result sets in one call
    pub fn merge<I, S>(sets: I) -> Vec<AnalysisResult>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = AnalysisResult>,
    {
        let mut merger = Self::new();
        for set in sets {
            merger.extend(set);
        }
        merger.into_results()
    }
}

/// Total order of preference between two results for the same key
pub fn preference(a: &AnalysisResult, b: &AnalysisResult) -> Ordering {
    a.confidence
        .total_cmp(&b.confidence)
        .then_with(|| source_rank(a.source).cmp(&source_rank(b.source)))
        .then_with(|| b.status.cmp(&a.status))
        .then_with(|| a.notes.cmp(&b.notes))
        .then_with(|| a.matched_name.cmp(&b.matched_name))
        .then_with(|| a.matched_rule.cmp(&b.matched_rule))
        .then_with(|| a.recommended_version.cmp(&b.recommended_version))
        .then_with(|| a.minimum_supported_version.cmp(&b.minimum_supported_version))
        .then_with(|| a.component.name().cmp(b.component.name()))
        .then_with(|| a.component.version().cmp(b.component.version()))
        .then_with(|| a.component.properties().cmp(b.component.properties()))
        .then_with(|| error_label(a).cmp(&error_label(b)))
}

fn error_label(result: &AnalysisResult) -> Option<&'static str> {
    result.error_type.map(|e| e.as_str())
}

fn source_rank(source: ResultSource) -> u8 {
    match source {
        ResultSource::Static => 0,
        ResultSource::Runtime => 1,
    }
}
