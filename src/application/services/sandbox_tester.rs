use super::runtime_verifier::VerifierPhase;
use crate::compatibility::domain::{
    AnalysisResult, BinaryCheck, Component, ComponentKey, Ecosystem, InstallErrorType,
    ResultSource, RuntimeTestOutcome, TargetArchitecture,
};
use crate::compatibility::services::{
    BinaryInspector, FallbackDecision, InstallErrorClassifier, SandboxVerdict, VersionFallback,
    VersionTrial,
};
use crate::ports::outbound::{SandboxExecution, SandboxRequest, SandboxRunner};
use crate::shared::error::{CompatError, SandboxError};
use crate::shared::CancelToken;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

type PackageGroup = Vec<(ComponentKey, Component)>;

/// SandboxTester - install tests with version fallback
///
/// Components are grouped by (ecosystem, package identity). Groups run
/// concurrently on a bounded pool; inside a group versions are tried one at
/// a time in ascending order and testing stops at the first pass.
/// Unparseable versions are tested on their own.
pub struct SandboxTester {
    runner: Arc<dyn SandboxRunner>,
    target: TargetArchitecture,
    timeout: Duration,
    max_concurrency: usize,
}

impl SandboxTester {
    pub fn new(
        runner: Arc<dyn SandboxRunner>,
        target: TargetArchitecture,
        timeout: Duration,
        max_concurrency: usize,
    ) -> Self {
        Self {
            runner,
            target,
            timeout,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn supports(&self, ecosystem: Ecosystem) -> bool {
        self.runner.supports(ecosystem)
    }

    /// Tests every component the runner supports; results come back sorted
    /// by key. Unsupported components are skipped.
    ///
    /// `on_progress(done, total)` counts finished package groups.
    ///
    /// # Errors
    /// [`CompatError::Cancelled`] after the token fires. Every sandbox that
    /// was running has been torn down by then.
    pub async fn test_all(
        &self,
        components: Vec<(ComponentKey, Component)>,
        cancel: &CancelToken,
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Vec<AnalysisResult>, CompatError> {
        let mut groups: BTreeMap<(Ecosystem, String), PackageGroup> = BTreeMap::new();
        for (key, component) in components {
            if !self.supports(key.ecosystem) {
                continue;
            }
            groups
                .entry((key.ecosystem, key.name.clone()))
                .or_default()
                .push((key, component));
        }

        let total = groups.len();
        let mut done = 0;
        let mut results = Vec::new();
        let mut tests = stream::iter(groups.into_values())
            .map(|group| self.test_group(group, cancel))
            .buffer_unordered(self.max_concurrency);

        while let Some(group_results) = tests.next().await {
            results.extend(group_results?);
            done += 1;
            on_progress(done, total);
        }

        results.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(results)
    }

    async fn test_group(
        &self,
        group: PackageGroup,
        cancel: &CancelToken,
    ) -> Result<Vec<AnalysisResult>, CompatError> {
        let versions: Vec<String> = group.iter().map(|(key, _)| key.version.clone()).collect();
        let (ordered, unparseable) = VersionFallback::order(&versions);
        let Some((_, first)) = group.first() else {
            return Ok(Vec::new());
        };
        let package = first.name().to_string();
        let ecosystem = first.ecosystem();

        let mut trials = Vec::with_capacity(ordered.len());
        let mut passed = false;
        for version in ordered {
            let verdict = if passed {
                None
            } else {
                let verdict = self.run_one(ecosystem, &package, &version, cancel).await?;
                passed = matches!(verdict, SandboxVerdict::Passed { .. });
                Some(verdict)
            };
            trials.push(VersionTrial { version, verdict });
        }

        let mut decisions = VersionFallback::decide(&trials, self.target);
        for version in unparseable {
            let verdict = self.run_one(ecosystem, &package, &version, cancel).await?;
            let trial = VersionTrial {
                version,
                verdict: Some(verdict),
            };
            decisions.extend(VersionFallback::decide(&[trial], self.target));
        }

        let by_version: BTreeMap<&str, &FallbackDecision> = decisions
            .iter()
            .map(|decision| (decision.version.as_str(), decision))
            .collect();

        Ok(group
            .iter()
            .filter_map(|(key, component)| {
                by_version
                    .get(key.version.as_str())
                    .map(|decision| result_from(decision, key, component))
            })
            .collect())
    }

    async fn run_one(
        &self,
        ecosystem: Ecosystem,
        package: &str,
        version: &str,
        cancel: &CancelToken,
    ) -> Result<SandboxVerdict, CompatError> {
        if cancel.is_cancelled() {
            return Err(CompatError::Cancelled);
        }
        let request = SandboxRequest {
            ecosystem,
            package: package.to_string(),
            version: version.to_string(),
            timeout: self.timeout,
        };
        tracing::info!(phase = %VerifierPhase::SandboxTest, ecosystem = %ecosystem, package, version, "sandbox install test");

        match self.runner.execute(&request, cancel).await {
            Ok(execution) => {
                let outcome = outcome_of(&execution, self.target);
                tracing::debug!(
                    package,
                    version,
                    exit_code = ?outcome.exit_code,
                    binary_check = ?outcome.binary_check,
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "sandbox execution finished"
                );
                Ok(verdict_of(&outcome))
            }
            Err(SandboxError::Cancelled) => Err(CompatError::Cancelled),
            Err(SandboxError::Timeout(limit)) => {
                tracing::warn!(package, version, "sandbox install timed out");
                Ok(SandboxVerdict::Inconclusive {
                    reason: format!("install exceeded {}s", limit.as_secs()),
                    error_type: None,
                })
            }
            Err(e) => {
                tracing::warn!(package, version, error = %e, "sandbox could not run");
                Ok(SandboxVerdict::Inconclusive {
                    reason: e.to_string(),
                    error_type: None,
                })
            }
        }
    }
}

/// Folds a finished execution into the per-install outcome record
pub fn outcome_of(execution: &SandboxExecution, target: TargetArchitecture) -> RuntimeTestOutcome {
    let installed = execution.exit_code == Some(0);
    let binary_check = if installed {
        BinaryInspector::inspect(target, execution.binaries.iter().map(|b| b.bytes.as_slice()))
    } else {
        BinaryCheck::NoNativeBinaries
    };
    let (error_type, error_details) = if installed {
        (None, None)
    } else {
        let output = execution.combined_output();
        (
            Some(InstallErrorClassifier::classify(&output)),
            Some(InstallErrorClassifier::snippet(&output)),
        )
    };

    RuntimeTestOutcome {
        exit_code: execution.exit_code,
        binary_check,
        error_type,
        error_details,
        elapsed: execution.elapsed,
    }
}

/// Environment failures (network, permissions) say nothing about the
/// package and are inconclusive.
pub fn verdict_of(outcome: &RuntimeTestOutcome) -> SandboxVerdict {
    if outcome.installed() {
        return match outcome.binary_check {
            BinaryCheck::NoNativeBinaries => SandboxVerdict::Passed {
                native_binaries: false,
            },
            BinaryCheck::TargetCompatible => SandboxVerdict::Passed {
                native_binaries: true,
            },
            BinaryCheck::ForeignOnly => SandboxVerdict::ForeignBinaries,
            BinaryCheck::Unreadable => SandboxVerdict::Inconclusive {
                reason: "installed native binaries could not be parsed".to_string(),
                error_type: None,
            },
        };
    }

    let error_type = outcome.error_type.unwrap_or(InstallErrorType::Unknown);
    let details = outcome
        .error_details
        .clone()
        .unwrap_or_else(|| format!("exit code {:?}", outcome.exit_code));
    if error_type.is_environmental() {
        SandboxVerdict::Inconclusive {
            reason: format!("{} problem in the sandbox: {}", error_type, details),
            error_type: Some(error_type),
        }
    } else {
        SandboxVerdict::Failed {
            error_type,
            details,
        }
    }
}

fn result_from(decision: &FallbackDecision, key: &ComponentKey, component: &Component) -> AnalysisResult {
    let mut result = AnalysisResult::new(
        key.clone(),
        component.clone(),
        decision.status,
        decision.confidence,
        ResultSource::Runtime,
    )
    .with_notes(decision.notes.clone())
    .with_recommended_version(decision.recommended_version.clone());
    if let Some(error_type) = decision.error_type {
        result = result.with_error_type(error_type);
    }
    result
}
