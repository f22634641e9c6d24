//! arch-compat - CPU architecture compatibility assessment
//!
//! Resolves whether every component of a dependency inventory runs on a
//! target architecture (ARM64 by default), combining curated knowledge
//! bases, package registry metadata and optional sandboxed installs.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`compatibility`): value types, matching, status resolution and merge policies
//! - **Application Layer** (`application`): use cases, runtime verification services and DTOs
//! - **Ports** (`ports`): interfaces for registries, caches, sandboxes and output
//! - **Adapters** (`adapters`): filesystem, network, cache, sandbox and console implementations
//! - **Shared** (`shared`): errors, cancellation, security checks and tracing setup
//!
//! # Example
//!
//! ```no_run
//! use arch_compat::prelude::*;
//! use std::collections::BTreeMap;
//! use std::path::{Path, PathBuf};
//!
//! # async fn run() -> Result<()> {
//! let settings = EngineSettings::default();
//! let knowledge_base = KnowledgeBaseLoader::load(&[PathBuf::from("knowledge_bases")], &[])?;
//! let context = EngineFactory::analysis_context(
//!     &settings,
//!     knowledge_base,
//!     BTreeMap::new(),
//!     FastPathTable::builtin(),
//! );
//!
//! let use_case = AnalyzeComponentsUseCase::new(context, None, StderrProgressReporter::new());
//! let components = FileSystemReader::read_components(Path::new("components.json"))?;
//! let report = use_case
//!     .execute(AnalysisRequest::new(components), &CancelToken::never())
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod compatibility;
pub mod config;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, KnowledgeBaseLoader, StdoutPresenter,
    };
    pub use crate::application::dto::{
        AnalysisReport, AnalysisRequest, EcosystemManifest, PartialResultSet, ResultStage,
    };
    pub use crate::application::factories::EngineFactory;
    pub use crate::application::use_cases::{
        AnalyzeComponentsUseCase, GenerateManifestsUseCase, MergeResultsUseCase,
        VerifyRuntimeUseCase,
    };
    pub use crate::compatibility::domain::{
        AnalysisResult, CompatibilityStatus, Component, ComponentKey, Ecosystem, KnowledgeBase,
        TargetArchitecture,
    };
    pub use crate::compatibility::policies::FastPathTable;
    pub use crate::config::EngineSettings;
    pub use crate::ports::outbound::{
        OutputPresenter, ProgressReporter, RegistryClient, SandboxRunner,
    };
    pub use crate::shared::{CancelToken, CancellationSignal, Result};
}
