use crate::application::dto::{AnalysisReport, AnalysisRequest, ComponentError};
use crate::application::services::{AnalysisContext, RuntimeBatch, RuntimePipeline};
use crate::compatibility::domain::{AnalysisResult, Component};
use crate::compatibility::services::ResultMerger;
use crate::ports::outbound::ProgressReporter;
use crate::shared::error::CompatError;
use crate::shared::{CancelToken, Result};
use std::time::Instant;

/// AnalyzeComponentsUseCase - single-pass analysis
///
/// Static resolution for every component, then (on request) runtime
/// verification and sandbox tests, merged per component key into one
/// report.
///
/// # Type Parameters
/// * `PR` - ProgressReporter implementation
pub struct AnalyzeComponentsUseCase<PR> {
    context: AnalysisContext,
    runtime: Option<RuntimePipeline>,
    progress_reporter: PR,
}

impl<PR> AnalyzeComponentsUseCase<PR>
where
    PR: ProgressReporter,
{
    pub fn new(
        context: AnalysisContext,
        runtime: Option<RuntimePipeline>,
        progress_reporter: PR,
    ) -> Self {
        Self {
            context,
            runtime,
            progress_reporter,
        }
    }

    /// # Errors
    /// [`CompatError::Cancelled`] when the token fires, or a request for
    /// runtime verification without a configured pipeline. Per-component
    /// failures never fail the run.
    pub async fn execute(&self, request: AnalysisRequest, cancel: &CancelToken) -> Result<AnalysisReport> {
        let started = Instant::now();
        let components = request.selected_components();
        let excluded = request.components.len() - components.len();
        if excluded > 0 {
            self.progress_reporter.report(&format!(
                "🚫 Excluded {} system package(s)",
                excluded
            ));
        }

        if cancel.is_cancelled() {
            return Err(CompatError::Cancelled.into());
        }

        let static_results = self.resolve_static(&components);

        let mut errors: Vec<ComponentError> = Vec::new();
        let mut results = static_results;
        if request.runtime || request.sandbox {
            let Some(pipeline) = &self.runtime else {
                anyhow::bail!("Runtime verification was requested but no registry client is configured");
            };
            let RuntimeBatch {
                results: runtime_results,
                errors: runtime_errors,
            } = pipeline
                .run(
                    self.context.keyed(&components),
                    request.sandbox,
                    cancel,
                    &self.progress_reporter,
                )
                .await?;

            for error in &runtime_errors {
                self.progress_reporter.report_error(&format!(
                    "⚠️  Warning: {}: {}",
                    error.component, error.message
                ));
            }
            errors = runtime_errors;
            results = ResultMerger::merge([results, runtime_results]);
        } else {
            results = ResultMerger::merge([results]);
        }

        let report = AnalysisReport::new(self.context.target(), results, errors, started.elapsed());
        tracing::info!(
            run_id = %report.run_id,
            total = report.summary.total,
            processing_time_ms = report.summary.processing_time_ms,
            "analysis finished"
        );
        Ok(report)
    }

    fn resolve_static(&self, components: &[Component]) -> Vec<AnalysisResult> {
        let total = components.len();
        self.progress_reporter.report(&format!(
            "🔎 Resolving {} component(s) against {} knowledge base record(s)...",
            total,
            self.context.knowledge_base().len()
        ));

        let results: Vec<AnalysisResult> = components
            .iter()
            .enumerate()
            .map(|(index, component)| {
                let result = self.context.resolve_static(component);
                self.progress_reporter
                    .report_progress(index + 1, total, Some("static resolution"));
                result
            })
            .collect();

        self.progress_reporter.report_completion(&format!(
            "✅ Static resolution complete: {} component(s)",
            total
        ));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::RuntimeVerifier;
    use crate::compatibility::domain::{
        CompatibilityRecord, CompatibilityStatus, DenyListEntry, Ecosystem, KnowledgeBase, RegistryLookup, ResultSource, TargetArchitecture, VersionRange,
    };
    use crate::compatibility::policies::FastPathTable;
    use crate::compatibility::services::{ComponentNormalizer, MatchSettings};
    use crate::ports::outbound::{PackageQuery, RegistryClient};
    use crate::shared::error::RegistryError;
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingReporter {
        errors: RefCell<Vec<String>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, _message: &str) {}
        fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}
        fn report_error(&self, message: &str) {
            self.errors.borrow_mut().push(message.to_string());
        }
        fn report_completion(&self, _message: &str) {}
    }

    struct FailingRegistry;

    #[async_trait]
    impl RegistryClient for FailingRegistry {
        async fn lookup(&self, _query: &PackageQuery) -> std::result::Result<RegistryLookup, RegistryError> {
            Err(RegistryError::Timeout(std::time::Duration::from_secs(15)))
        }
    }

    fn context() -> AnalysisContext {
        let mut builder = KnowledgeBase::builder();
        builder.add_record(CompatibilityRecord::new("nginx").with_rule(
            VersionRange::parse(">=1.18.0").unwrap(),
            CompatibilityStatus::Compatible,
            "",
        ));
        builder.add_deny_entry(DenyListEntry::new("mssql-server", "x86 only"));
        AnalysisContext::new(
            Arc::new(builder.build()),
            ComponentNormalizer::default(),
            MatchSettings::default(),
            FastPathTable::empty(),
            TargetArchitecture::Arm64,
        )
    }

    fn components() -> Vec<Component> {
        vec![
            Component::new("nginx", "1.20.2", Ecosystem::Os),
            Component::new("mssql-server", "2019", Ecosystem::Os),
            Component::new("requests", "2.31.0", Ecosystem::Pypi),
        ]
    }

    #[tokio::test]
    async fn test_static_only_run() {
        let use_case = AnalyzeComponentsUseCase::new(context(), None, RecordingReporter::default());
        let report = use_case
            .execute(AnalysisRequest::new(components()), &CancelToken::never())
            .await
            .unwrap();

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.count(CompatibilityStatus::Compatible), 1);
        assert_eq!(report.summary.count(CompatibilityStatus::Incompatible), 1);
        assert_eq!(report.summary.count(CompatibilityStatus::Unknown), 1);
        assert!(report.has_incompatible());
    }

    #[tokio::test]
    async fn test_exclude_system() {
        let use_case = AnalyzeComponentsUseCase::new(context(), None, RecordingReporter::default());
        let request = AnalysisRequest::new(components()).with_exclude_system(true);
        let report = use_case.execute(request, &CancelToken::never()).await.unwrap();
        assert_eq!(report.summary.total, 1);
    }

    #[tokio::test]
    async fn test_runtime_without_pipeline_is_an_error() {
        let use_case = AnalyzeComponentsUseCase::new(context(), None, RecordingReporter::default());
        let request = AnalysisRequest::new(components()).with_runtime(true);
        assert!(use_case.execute(request, &CancelToken::never()).await.is_err());
    }

    #[tokio::test]
    async fn test_registry_failures_are_reported_not_fatal() {
        let verifier = RuntimeVerifier::new(
            Arc::new(FailingRegistry),
            FastPathTable::empty(),
            TargetArchitecture::Arm64,
            2,
        );
        let reporter = RecordingReporter::default();
        let use_case =
            AnalyzeComponentsUseCase::new(context(), Some(RuntimePipeline::new(verifier, None)), reporter);
        let request = AnalysisRequest::new(components()).with_runtime(true);
        let report = use_case.execute(request, &CancelToken::never()).await.unwrap();

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.errors.len(), 1);
        assert_eq!(use_case.progress_reporter.errors.borrow().len(), 1);

        let nginx = report.results.iter().find(|r| r.key.name == "nginx").unwrap();
        assert_eq!(nginx.source, ResultSource::Static);
        let deny = report.results.iter().find(|r| r.key.name == "mssql-server").unwrap();
        assert_eq!(deny.status, CompatibilityStatus::Incompatible);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let signal = crate::shared::CancellationSignal::new();
        signal.cancel();
        let use_case = AnalyzeComponentsUseCase::new(context(), None, RecordingReporter::default());
        let error = use_case
            .execute(AnalysisRequest::new(components()), &signal.token())
            .await
            .unwrap_err();
        assert!(matches!(error.downcast_ref::<CompatError>(), Some(CompatError::Cancelled)));
    }
}
