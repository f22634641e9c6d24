use crate::compatibility::domain::{
    AnalysisResult, CompatibilityStatus, ComponentKey, TargetArchitecture,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// A per-component problem that degraded (but did not drop) its result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentError {
    pub component: ComponentKey,
    pub message: String,
}

impl ComponentError {
    pub fn new(component: ComponentKey, message: impl Into<String>) -> Self {
        Self {
            component,
            message: message.into(),
        }
    }
}

/// Per-status counts and run statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total: usize,
    /// Every status appears, including those with a zero count
    pub by_status: BTreeMap<CompatibilityStatus, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ComponentError>,
    pub processing_time_ms: u64,
}

impl AnalysisSummary {
    pub fn from_results(
        results: &[AnalysisResult],
        errors: Vec<ComponentError>,
        elapsed: Duration,
    ) -> Self {
        let mut by_status: BTreeMap<CompatibilityStatus, usize> =
            CompatibilityStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for result in results {
            *by_status.entry(result.status).or_default() += 1;
        }

        Self {
            total: results.len(),
            by_status,
            errors,
            processing_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn count(&self, status: CompatibilityStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// AnalysisReport - outcome of one analysis run, handed to reporting layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub target_architecture: TargetArchitecture,
    pub results: Vec<AnalysisResult>,
    pub summary: AnalysisSummary,
}

impl AnalysisReport {
    pub fn new(
        target_architecture: TargetArchitecture,
        results: Vec<AnalysisResult>,
        errors: Vec<ComponentError>,
        elapsed: Duration,
    ) -> Self {
        let summary = AnalysisSummary::from_results(&results, errors, elapsed);
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            target_architecture,
            results,
            summary,
        }
    }

    /// Used for the CI exit code
    pub fn has_incompatible(&self) -> bool {
        self.summary.count(CompatibilityStatus::Incompatible) > 0
    }
}
