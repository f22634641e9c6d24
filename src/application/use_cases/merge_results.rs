use crate::application::dto::{AnalysisReport, ComponentError, PartialResultSet};
use crate::compatibility::domain::TargetArchitecture;
use crate::compatibility::services::ResultMerger;
use crate::ports::outbound::ProgressReporter;
use crate::shared::Result;
use std::time::Instant;

/// MergeResultsUseCase - combines partial result files into one report
///
/// Merging is by component key and is order-independent: the same inputs
/// in any order, or repeated, give the same report contents.
pub struct MergeResultsUseCase<PR> {
    progress_reporter: PR,
}

impl<PR> MergeResultsUseCase<PR>
where
    PR: ProgressReporter,
{
    pub fn new(progress_reporter: PR) -> Self {
        Self { progress_reporter }
    }

    pub fn execute(
        &self,
        partials: Vec<PartialResultSet>,
        target: TargetArchitecture,
    ) -> Result<AnalysisReport> {
        if partials.is_empty() {
            anyhow::bail!("Nothing to merge: no partial result files were given");
        }
        let started = Instant::now();

        for partial in &partials {
            self.progress_reporter.report(&format!(
                "   - {} stage{}: {} result(s) (run {})",
                partial.stage,
                partial
                    .ecosystem
                    .map(|e| format!(" [{}]", e))
                    .unwrap_or_default(),
                partial.results.len(),
                partial.run_id
            ));
        }

        let input_count: usize = partials.iter().map(|p| p.results.len()).sum();
        let mut errors: Vec<ComponentError> = Vec::new();
        let mut result_sets = Vec::with_capacity(partials.len());
        for partial in partials {
            errors.extend(partial.errors);
            result_sets.push(partial.results);
        }
        errors.sort_by(|a, b| (&a.component, &a.message).cmp(&(&b.component, &b.message)));
        errors.dedup();

        let merged = ResultMerger::merge(result_sets);
        self.progress_reporter.report_completion(&format!(
            "✅ Merged {} result(s) into {} component(s)",
            input_count,
            merged.len()
        ));

        Ok(AnalysisReport::new(target, merged, errors, started.elapsed()))
    }
}
