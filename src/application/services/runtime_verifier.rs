use crate::application::dto::ComponentError;
use crate::compatibility::domain::{
    AnalysisResult, CompatibilityStatus, Component, ComponentKey, RegistryLookup, ResultSource,
    TargetArchitecture,
};
use crate::compatibility::policies::{FastPathTable, RegistryRules, FAST_PATH_CONFIDENCE};
use crate::ports::outbound::{PackageQuery, RegistryClient};
use crate::shared::error::CompatError;
use crate::shared::CancelToken;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;

/// Confidence when the registry could not be reached
pub const REGISTRY_FAILURE_CONFIDENCE: f64 = 0.2;

/// Verification state of one component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierPhase {
    Idle,
    FastPath,
    ApiLookup,
    SandboxTest,
    Done,
}

impl fmt::Display for VerifierPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VerifierPhase::Idle => "idle",
            VerifierPhase::FastPath => "fast_path",
            VerifierPhase::ApiLookup => "api_lookup",
            VerifierPhase::SandboxTest => "sandbox_test",
            VerifierPhase::Done => "done",
        };
        f.write_str(label)
    }
}

/// Outcome of verifying one component through the fast path and registry
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub result: AnalysisResult,
    /// Answered from the curated table, without any network call
    pub fast_path_hit: bool,
    pub error: Option<ComponentError>,
}

/// RuntimeVerifier - fast-path table, then registry metadata
///
/// The registry client is expected to carry its own cache and retry policy.
/// Lookups run on a bounded pool; registry failures degrade to `unknown`
/// with a component error and never abort the batch.
pub struct RuntimeVerifier {
    registry: Arc<dyn RegistryClient>,
    fast_path: FastPathTable,
    target: TargetArchitecture,
    max_concurrency: usize,
}

impl RuntimeVerifier {
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        fast_path: FastPathTable,
        target: TargetArchitecture,
        max_concurrency: usize,
    ) -> Self {
        Self {
            registry,
            fast_path,
            target,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Verifies every component; results come back sorted by key.
    ///
    /// `on_progress(done, total)` is called after each completion.
    ///
    /// # Errors
    /// [`CompatError::Cancelled`] once the token fires; in-flight lookups
    /// are dropped first.
    pub async fn verify_all(
        &self,
        components: Vec<(ComponentKey, Component)>,
        cancel: &CancelToken,
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Vec<Verification>, CompatError> {
        let total = components.len();
        let mut verifications = Vec::with_capacity(total);

        {
            let mut lookups = stream::iter(components)
                .map(|(key, component)| self.verify_one(key, component))
                .buffer_unordered(self.max_concurrency);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(CompatError::Cancelled),
                    next = lookups.next() => match next {
                        Some(verification) => {
                            verifications.push(verification);
                            on_progress(verifications.len(), total);
                        }
                        None => break,
                    },
                }
            }
        }

        verifications.sort_by(|a, b| a.result.key.cmp(&b.result.key));
        Ok(verifications)
    }

    pub async fn verify_one(&self, key: ComponentKey, component: Component) -> Verification {
        let mut phase = VerifierPhase::Idle;
        tracing::debug!(%phase, package = %key.name, "runtime verification queued");

        phase = VerifierPhase::FastPath;
        if let Some(entry) = self.fast_path.lookup(key.ecosystem, &key.name) {
            tracing::debug!(%phase, package = %key.name, status = %entry.status, "fast path hit");
            let result = AnalysisResult::new(
                key,
                component,
                entry.status,
                FAST_PATH_CONFIDENCE,
                ResultSource::Runtime,
            )
            .with_notes(format!("Fast path: {}", entry.notes));
            return Verification {
                result,
                fast_path_hit: true,
                error: None,
            };
        }

        phase = VerifierPhase::ApiLookup;
        let ecosystem = key.ecosystem;
        let lookup = if ecosystem.has_registry() {
            let query = PackageQuery::new(ecosystem, component.name(), component.version());
            self.registry.lookup(&query).await
        } else {
            Ok(RegistryLookup::Unsupported)
        };

        let verification = match lookup {
            Ok(lookup) => {
                let verdict = RegistryRules::evaluate(&lookup, ecosystem, self.target);
                let mut result = AnalysisResult::new(
                    key,
                    component,
                    verdict.status,
                    verdict.confidence,
                    ResultSource::Runtime,
                )
                .with_notes(verdict.notes);
                if let RegistryLookup::Found(metadata) = &lookup {
                    if verdict.status != CompatibilityStatus::Compatible {
                        result = result.with_recommended_version(metadata.resolved_version.clone());
                    }
                }
                Verification {
                    result,
                    fast_path_hit: false,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(%phase, ecosystem = %ecosystem, package = %key.name, error = %e, "registry lookup failed");
                let message = format!("Registry lookup failed: {}", e);
                let error = ComponentError::new(key.clone(), message.clone());
                let result = AnalysisResult::new(
                    key,
                    component,
                    CompatibilityStatus::Unknown,
                    REGISTRY_FAILURE_CONFIDENCE,
                    ResultSource::Runtime,
                )
                .with_notes(message);
                Verification {
                    result,
                    fast_path_hit: false,
                    error: Some(error),
                }
            }
        };

        phase = VerifierPhase::Done;
        tracing::debug!(
            %phase,
            package = %verification.result.key.name,
            status = %verification.result.status,
            confidence = verification.result.confidence,
            "runtime verification finished"
        );
        verification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::{Ecosystem, RegistryMetadata};
    use crate::compatibility::policies::FastPathEntry;
    use crate::shared::error::RegistryError;
    use crate::shared::CancellationSignal;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ScriptedRegistry {
        calls: AtomicUsize,
        answer: Result<RegistryLookup, RegistryError>,
        delay: Duration,
    }

    impl ScriptedRegistry {
        fn new(answer: Result<RegistryLookup, RegistryError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl RegistryClient for ScriptedRegistry {
        async fn lookup(&self, _query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.answer.clone()
        }
    }

    fn item(name: &str, version: &str, ecosystem: Ecosystem) -> (ComponentKey, Component) {
        (
            ComponentKey::new(ecosystem, name, version),
            Component::new(name, version, ecosystem),
        )
    }

    fn verifier(registry: Arc<ScriptedRegistry>, fast_path: FastPathTable) -> RuntimeVerifier {
        RuntimeVerifier::new(registry, fast_path, TargetArchitecture::Arm64, 4)
    }

    #[tokio::test]
    async fn test_fast_path_hit_skips_registry() {
        let registry = Arc::new(ScriptedRegistry::new(Ok(RegistryLookup::NotFound)));
        let fast_path = FastPathTable::from_entries([(
            Ecosystem::Pypi,
            "numpy".to_string(),
            FastPathEntry {
                status: CompatibilityStatus::Compatible,
                notes: "aarch64 wheels".to_string(),
            },
        )]);
        let verifier = verifier(registry.clone(), fast_path);

        let (key, component) = item("numpy", "1.26.0", Ecosystem::Pypi);
        let verification = verifier.verify_one(key, component).await;

        assert!(verification.fast_path_hit);
        assert_eq!(verification.result.confidence, FAST_PATH_CONFIDENCE);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_registry_metadata_is_evaluated() {
        let registry = Arc::new(ScriptedRegistry::new(Ok(RegistryLookup::Found(
            RegistryMetadata {
                artifacts: vec!["lib-1.0-cp311-cp311-manylinux_2_17_aarch64.whl".into()],
                ..Default::default()
            },
        ))));
        let verifier = verifier(registry.clone(), FastPathTable::empty());

        let (key, component) = item("lib", "1.0", Ecosystem::Pypi);
        let verification = verifier.verify_one(key, component).await;

        assert_eq!(verification.result.status, CompatibilityStatus::Compatible);
        assert_eq!(verification.result.source, ResultSource::Runtime);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_registry_failure_degrades_to_unknown() {
        let registry = Arc::new(ScriptedRegistry::new(Err(RegistryError::Network(
            "connection reset".into(),
        ))));
        let verifier = verifier(registry, FastPathTable::empty());

        let (key, component) = item("left-pad", "1.3.0", Ecosystem::Npm);
        let verification = verifier.verify_one(key, component).await;

        assert_eq!(verification.result.status, CompatibilityStatus::Unknown);
        assert!(verification.result.confidence <= REGISTRY_FAILURE_CONFIDENCE);
        assert!(verification.error.unwrap().message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_os_components_never_reach_the_registry() {
        let registry = Arc::new(ScriptedRegistry::new(Ok(RegistryLookup::NotFound)));
        let verifier = verifier(registry.clone(), FastPathTable::empty());

        let (key, component) = item("openssl", "3.0.2", Ecosystem::Os);
        let verification = verifier.verify_one(key, component).await;

        assert_eq!(verification.result.status, CompatibilityStatus::Unknown);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_verify_all_sorts_and_reports_progress() {
        let registry = Arc::new(ScriptedRegistry::new(Ok(RegistryLookup::NotFound)));
        let verifier = verifier(registry, FastPathTable::empty());
        let items = vec![
            item("zeta", "1.0", Ecosystem::Npm),
            item("alpha", "1.0", Ecosystem::Npm),
            item("mid", "1.0", Ecosystem::Npm),
        ];

        let mut progress = Vec::new();
        let verifications = verifier
            .verify_all(items, &CancelToken::never(), &mut |done, total| {
                progress.push((done, total))
            })
            .await
            .unwrap();

        let names: Vec<&str> = verifications.iter().map(|v| v.result.key.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert_eq!(progress.last(), Some(&(3, 3)));
    }

    #[tokio::test]
    async fn test_verify_all_stops_on_cancel() {
        let registry = Arc::new(ScriptedRegistry {
            delay: Duration::from_secs(30),
            ..ScriptedRegistry::new(Ok(RegistryLookup::NotFound))
        });
        let verifier = verifier(registry, FastPathTable::empty());
        let signal = CancellationSignal::new();
        let token = signal.token();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            signal.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            verifier.verify_all(vec![item("slow", "1.0", Ecosystem::Npm)], &token, &mut |_, _| {}),
        )
        .await
        .expect("cancellation should stop the batch");

        assert!(matches!(outcome, Err(CompatError::Cancelled)));
        canceller.await.unwrap();
    }
}
