mod binary_inspector;
mod error_classifier;
mod matcher;
mod normalizer;
mod result_merger;
mod similarity;
mod status_resolver;
mod version_fallback;

pub use binary_inspector::{BinaryInspector, DetectedArch};
pub use error_classifier::InstallErrorClassifier;
pub use matcher::{
    KnowledgeBaseMatcher, MatchKind, MatchOutcome, MatchSettings, DEFAULT_FUZZY_THRESHOLD,
};
pub use normalizer::ComponentNormalizer;
pub use result_merger::{preference, ResultMerger};
pub use similarity::{LevenshteinSimilarity, SimilarityScorer};
pub use status_resolver::StatusResolver;
pub use version_fallback::{FallbackDecision, SandboxVerdict, VersionFallback, VersionTrial};
