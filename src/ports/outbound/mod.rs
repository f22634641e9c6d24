/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the compatibility engine uses
/// to reach package registries, the result cache, sandboxes and the console.
pub mod cache_store;
pub mod output_presenter;
pub mod progress_reporter;
pub mod registry_client;
pub mod sandbox_runner;

pub use cache_store::{CacheKey, CacheStore};
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use registry_client::{PackageQuery, RegistryClient};
pub use sandbox_runner::{BinaryArtifact, SandboxExecution, SandboxRequest, SandboxRunner};
