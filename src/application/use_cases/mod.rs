/// Use cases module containing application business logic orchestration
mod analyze_components;
mod generate_manifests;
mod merge_results;
mod verify_runtime;

pub use analyze_components::AnalyzeComponentsUseCase;
pub use generate_manifests::GenerateManifestsUseCase;
pub use merge_results::MergeResultsUseCase;
pub use verify_runtime::VerifyRuntimeUseCase;
