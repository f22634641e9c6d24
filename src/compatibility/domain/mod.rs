pub mod analysis_result;
pub mod architecture;
pub mod component;
pub mod knowledge_base;
pub mod registry_metadata;
pub mod runtime_outcome;
pub mod status;
pub mod version;
pub mod version_range;

pub use analysis_result::{AnalysisResult, ResultSource};
pub use architecture::TargetArchitecture;
pub use component::{canonical_name, package_identity, Component, ComponentKey, Ecosystem};
pub use knowledge_base::{
    CompatibilityRecord, DenyListEntry, FuzzyCandidate, KnowledgeBase, KnowledgeBaseBuilder,
    VersionRule,
};
pub use registry_metadata::{RegistryLookup, RegistryMetadata};
pub use runtime_outcome::{BinaryCheck, InstallErrorType, RuntimeTestOutcome};
pub use status::CompatibilityStatus;
pub use version::{ReleaseStage, Version};
pub use version_range::{RangeEvaluation, RangeParseError, VersionRange};
