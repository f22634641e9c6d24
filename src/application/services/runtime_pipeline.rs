use super::runtime_verifier::{RuntimeVerifier, Verification};
use super::sandbox_tester::SandboxTester;
use crate::application::dto::ComponentError;
use crate::compatibility::domain::{AnalysisResult, CompatibilityStatus, Component, ComponentKey};
use crate::ports::outbound::ProgressReporter;
use crate::shared::error::CompatError;
use crate::shared::CancelToken;
use std::collections::BTreeMap;

/// Ceiling applied when the sandbox could not confirm a registry answer
pub const UNCONFIRMED_CONFIDENCE_CEILING: f64 = 0.5;

/// Results of the runtime stage for one batch of components
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeBatch {
    pub results: Vec<AnalysisResult>,
    pub errors: Vec<ComponentError>,
}

/// RuntimePipeline - registry verification, then the optional sandbox test
///
/// Fast-path hits are not sandboxed. A conclusive sandbox verdict replaces
/// the registry answer; an inconclusive one (timeout, environment trouble)
/// turns a definitive registry answer into `needs_verification` with
/// capped confidence.
pub struct RuntimePipeline {
    verifier: RuntimeVerifier,
    sandbox: Option<SandboxTester>,
}

impl RuntimePipeline {
    pub fn new(verifier: RuntimeVerifier, sandbox: Option<SandboxTester>) -> Self {
        Self { verifier, sandbox }
    }

    pub fn has_sandbox(&self) -> bool {
        self.sandbox.is_some()
    }

    /// # Errors
    /// [`CompatError::Cancelled`] if the token fires during either phase
    pub async fn run(
        &self,
        components: Vec<(ComponentKey, Component)>,
        use_sandbox: bool,
        cancel: &CancelToken,
        progress: &dyn ProgressReporter,
    ) -> Result<RuntimeBatch, CompatError> {
        progress.report(&format!(
            "🌐 Checking {} component(s) against package registries...",
            components.len()
        ));
        let verifications = self
            .verifier
            .verify_all(components, cancel, &mut |done, total| {
                progress.report_progress(done, total, Some("registry lookups"))
            })
            .await?;

        let fast_path_hits = verifications.iter().filter(|v| v.fast_path_hit).count();
        let mut errors: Vec<ComponentError> = Vec::new();
        let mut by_key: BTreeMap<ComponentKey, AnalysisResult> = BTreeMap::new();
        let mut sandbox_candidates = Vec::new();
        for Verification {
            result,
            fast_path_hit,
            error,
        } in verifications
        {
            errors.extend(error);
            if !fast_path_hit {
                sandbox_candidates.push((result.key.clone(), result.component.clone()));
            }
            by_key.insert(result.key.clone(), result);
        }
        progress.report_completion(&format!(
            "✅ Registry checks complete: {} component(s), {} from the fast path",
            by_key.len(),
            fast_path_hits
        ));

        let tester = match (&self.sandbox, use_sandbox) {
            (Some(tester), true) => tester,
            _ => {
                return Ok(RuntimeBatch {
                    results: by_key.into_values().collect(),
                    errors,
                })
            }
        };

        sandbox_candidates.retain(|(key, _)| tester.supports(key.ecosystem));
        progress.report(&format!(
            "🧪 Sandbox-testing {} component(s)...",
            sandbox_candidates.len()
        ));
        let sandboxed = tester
            .test_all(sandbox_candidates, cancel, &mut |done, total| {
                progress.report_progress(done, total, Some("sandbox installs"))
            })
            .await?;
        progress.report_completion(&format!(
            "✅ Sandbox tests complete: {} result(s)",
            sandboxed.len()
        ));

        for sandbox_result in sandboxed {
            if let Some(registry_result) = by_key.remove(&sandbox_result.key) {
                let combined = combine(registry_result, sandbox_result);
                by_key.insert(combined.key.clone(), combined);
            }
        }

        Ok(RuntimeBatch {
            results: by_key.into_values().collect(),
            errors,
        })
    }
}

/// Folds a sandbox result into the registry result for the same component
pub fn combine(registry: AnalysisResult, sandbox: AnalysisResult) -> AnalysisResult {
    let notes = join_notes(&sandbox.notes, &registry.notes);
    if sandbox.status != CompatibilityStatus::Unknown {
        return sandbox.with_notes(notes);
    }

    if registry.status == CompatibilityStatus::Unknown {
        let mut result = registry.with_notes(notes);
        result.error_type = sandbox.error_type;
        return result;
    }

    let mut result = registry
        .with_status(
            CompatibilityStatus::NeedsVerification,
            UNCONFIRMED_CONFIDENCE_CEILING,
        )
        .with_notes(notes);
    result.error_type = sandbox.error_type;
    result
}

fn join_notes(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{}; {}", first, second),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::{Ecosystem, ResultSource};

    fn result(status: CompatibilityStatus, confidence: f64, notes: &str) -> AnalysisResult {
        AnalysisResult::new(
            ComponentKey::new(Ecosystem::Pypi, "pkg", "1.0"),
            Component::new("pkg", "1.0", Ecosystem::Pypi),
            status,
            confidence,
            ResultSource::Runtime,
        )
        .with_notes(notes)
    }

    #[test]
    fn test_conclusive_sandbox_replaces_registry() {
        let combined = combine(
            result(CompatibilityStatus::Compatible, 0.85, "aarch64 wheel"),
            result(CompatibilityStatus::Incompatible, 0.85, "install failed"),
        );
        assert_eq!(combined.status, CompatibilityStatus::Incompatible);
        assert_eq!(combined.notes, "install failed; aarch64 wheel");
    }

    #[test]
    fn test_inconclusive_sandbox_caps_registry_answer() {
        let combined = combine(
            result(CompatibilityStatus::Compatible, 0.85, "aarch64 wheel"),
            result(CompatibilityStatus::Unknown, 0.2, "install exceeded 90s"),
        );
        assert_eq!(combined.status, CompatibilityStatus::NeedsVerification);
        assert!(combined.confidence <= UNCONFIRMED_CONFIDENCE_CEILING);
        assert!(!combined.current_version_supported);
    }

    #[test]
    fn test_inconclusive_sandbox_keeps_unknown_registry() {
        let combined = combine(
            result(CompatibilityStatus::Unknown, 0.2, "registry down"),
            result(CompatibilityStatus::Unknown, 0.2, "sandbox down"),
        );
        assert_eq!(combined.status, CompatibilityStatus::Unknown);
        assert_eq!(combined.confidence, 0.2);
    }
}
