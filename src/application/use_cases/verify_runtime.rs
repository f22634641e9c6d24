use crate::application::dto::{EcosystemManifest, PartialResultSet, ResultStage};
use crate::application::services::{AnalysisContext, RuntimeBatch, RuntimePipeline};
use crate::compatibility::domain::Component;
use crate::ports::outbound::ProgressReporter;
use crate::shared::{CancelToken, Result};

/// VerifyRuntimeUseCase - runtime-only mode
///
/// Consumes manifests produced by the manifest-only mode and returns the
/// runtime-stage partial result set for them.
pub struct VerifyRuntimeUseCase<PR> {
    context: AnalysisContext,
    pipeline: RuntimePipeline,
    progress_reporter: PR,
}

impl<PR> VerifyRuntimeUseCase<PR>
where
    PR: ProgressReporter,
{
    pub fn new(context: AnalysisContext, pipeline: RuntimePipeline, progress_reporter: PR) -> Self {
        Self {
            context,
            pipeline,
            progress_reporter,
        }
    }

    /// # Errors
    /// [`crate::shared::error::CompatError::Cancelled`] when the token fires
    pub async fn execute(
        &self,
        manifests: Vec<EcosystemManifest>,
        sandbox: bool,
        cancel: &CancelToken,
    ) -> Result<PartialResultSet> {
        let mut ecosystems: Vec<_> = manifests.iter().map(|m| m.ecosystem).collect();
        ecosystems.dedup();
        let ecosystem = match ecosystems.as_slice() {
            [single] => Some(*single),
            _ => None,
        };

        let components: Vec<Component> = manifests
            .iter()
            .flat_map(EcosystemManifest::to_components)
            .collect();
        self.progress_reporter.report(&format!(
            "📖 Loaded {} dependency(ies) from {} manifest(s)",
            components.len(),
            manifests.len()
        ));

        let RuntimeBatch { results, errors } = self
            .pipeline
            .run(
                self.context.keyed(&components),
                sandbox,
                cancel,
                &self.progress_reporter,
            )
            .await?;

        for error in &errors {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: {}: {}",
                error.component, error.message
            ));
        }

        Ok(PartialResultSet::new(ResultStage::Runtime, ecosystem, results).with_errors(errors))
    }
}
