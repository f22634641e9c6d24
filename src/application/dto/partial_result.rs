use super::{AnalysisReport, ComponentError};
use crate::compatibility::domain::{AnalysisResult, Ecosystem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stage that produced a partial result file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStage {
    Static,
    Runtime,
}

impl fmt::Display for ResultStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStage::Static => write!(f, "static"),
            ResultStage::Runtime => write!(f, "runtime"),
        }
    }
}

/// PartialResultSet - results of one independently-run stage or batch,
/// input to the merge step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialResultSet {
    pub stage: ResultStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<Ecosystem>,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<AnalysisResult>,
    /// Components whose result was degraded in this stage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ComponentError>,
}

impl PartialResultSet {
    pub fn new(stage: ResultStage, ecosystem: Option<Ecosystem>, results: Vec<AnalysisResult>) -> Self {
        Self {
            stage,
            ecosystem,
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            results,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<ComponentError>) -> Self {
        self.errors = errors;
        self
    }

    /// A full `analyze` report counts as a static-stage partial
    pub fn from_report(report: AnalysisReport) -> Self {
        Self {
            stage: ResultStage::Static,
            ecosystem: None,
            run_id: report.run_id,
            generated_at: report.generated_at,
            results: report.results,
            errors: report.summary.errors,
        }
    }
}
