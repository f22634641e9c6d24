/// Application services: the stateful pieces that sequence the pure
/// compatibility services over a batch of components
mod analysis_context;
mod runtime_pipeline;
mod runtime_verifier;
mod sandbox_tester;

pub use analysis_context::AnalysisContext;
pub use runtime_pipeline::{combine, RuntimeBatch, RuntimePipeline, UNCONFIRMED_CONFIDENCE_CEILING};
pub use runtime_verifier::{RuntimeVerifier, Verification, VerifierPhase, REGISTRY_FAILURE_CONFIDENCE};
pub use sandbox_tester::{outcome_of, verdict_of, SandboxTester};
