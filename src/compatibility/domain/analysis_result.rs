use super::component::{Component, ComponentKey};
use super::runtime_outcome::InstallErrorType;
use super::status::CompatibilityStatus;
use serde::{Deserialize, Serialize};

/// Which stage produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Knowledge base resolution
    Static,
    /// Fast path, registry or sandbox verification
    Runtime,
}

/// Verdict for one component.
///
/// `confidence` is always within `[0, 1]`; constructors clamp it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub key: ComponentKey,
    pub component: Component,
    pub status: CompatibilityStatus,
    pub confidence: f64,
    pub current_version_supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_supported_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_version: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// Knowledge base name, alias or fuzzy candidate that matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    /// Version range expression of the rule that produced the status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
    pub source: ResultSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<InstallErrorType>,
}

impl AnalysisResult {
    pub fn new(
        key: ComponentKey,
        component: Component,
        status: CompatibilityStatus,
        confidence: f64,
        source: ResultSource,
    ) -> Self {
        Self {
            key,
            component,
            status,
            confidence: clamp_confidence(confidence),
            current_version_supported: status == CompatibilityStatus::Compatible,
            minimum_supported_version: None,
            recommended_version: None,
            notes: String::new(),
            matched_name: None,
            matched_rule: None,
            source,
            error_type: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_minimum_supported_version(mut self, version: Option<String>) -> Self {
        self.minimum_supported_version = version;
        self
    }

    pub fn with_recommended_version(mut self, version: Option<String>) -> Self {
        self.recommended_version = version;
        self
    }

    pub fn with_matched_name(mut self, name: impl Into<String>) -> Self {
        self.matched_name = Some(name.into());
        self
    }

    pub fn with_matched_rule(mut self, rule: impl Into<String>) -> Self {
        self.matched_rule = Some(rule.into());
        self
    }

    pub fn with_error_type(mut self, error_type: InstallErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    /// Replaces status and confidence, keeping `current_version_supported`
    /// consistent with the new status.
    pub fn with_status(mut self, status: CompatibilityStatus, confidence: f64) -> Self {
        self.status = status;
        self.confidence = clamp_confidence(confidence);
        self.current_version_supported = status == CompatibilityStatus::Compatible;
        self
    }

    /// Caps confidence, e.g. for fuzzy matches or timed-out verification
    pub fn cap_confidence(mut self, ceiling: f64) -> Self {
        self.confidence = self.confidence.min(clamp_confidence(ceiling));
        self
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
