use crate::application::dto::{AnalysisRequest, EcosystemManifest};
use crate::compatibility::domain::Ecosystem;
use crate::ports::outbound::ProgressReporter;
use crate::shared::Result;

/// GenerateManifestsUseCase - manifest-only mode
///
/// Splits the inventory into one normalized dependency list per registry
/// ecosystem so runtime-only workers can verify them independently.
/// Ecosystems without a registry produce no manifest.
pub struct GenerateManifestsUseCase<PR> {
    progress_reporter: PR,
}

impl<PR> GenerateManifestsUseCase<PR>
where
    PR: ProgressReporter,
{
    pub fn new(progress_reporter: PR) -> Self {
        Self { progress_reporter }
    }

    pub fn execute(&self, request: AnalysisRequest) -> Result<Vec<EcosystemManifest>> {
        let components = request.selected_components();

        let manifests: Vec<EcosystemManifest> = Ecosystem::ALL
            .into_iter()
            .filter(Ecosystem::has_registry)
            .map(|ecosystem| EcosystemManifest::from_components(ecosystem, &components))
            .filter(|manifest| !manifest.is_empty())
            .collect();

        let skipped = components
            .iter()
            .filter(|c| !c.ecosystem().has_registry())
            .count();
        if skipped > 0 {
            self.progress_reporter.report(&format!(
                "ℹ️  {} component(s) without a package registry are left out of the manifests",
                skipped
            ));
        }

        for manifest in &manifests {
            self.progress_reporter.report(&format!(
                "   - {}: {} dependency(ies)",
                manifest.ecosystem,
                manifest.dependencies.len()
            ));
        }
        self.progress_reporter.report_completion(&format!(
            "✅ Generated {} manifest(s)",
            manifests.len()
        ));
        Ok(manifests)
    }
}
