/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod analysis_report;
mod analysis_request;
mod manifest;
mod partial_result;

pub use analysis_report::{AnalysisReport, AnalysisSummary, ComponentError};
pub use analysis_request::AnalysisRequest;
pub use manifest::{EcosystemManifest, ManifestDependency};
pub use partial_result::{PartialResultSet, ResultStage};
