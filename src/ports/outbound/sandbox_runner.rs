use crate::compatibility::domain::Ecosystem;
use crate::shared::error::SandboxError;
use crate::shared::CancelToken;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// One isolated install/resolve request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRequest {
    pub ecosystem: Ecosystem,
    /// Package name as the package manager expects it
    pub package: String,
    pub version: String,
    pub timeout: Duration,
}

/// Compiled artifact produced by an install, read back for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryArtifact {
    /// Path relative to the sandbox root
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Raw outcome of a finished sandbox execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxExecution {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub binaries: Vec<BinaryArtifact>,
}

impl SandboxExecution {
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// SandboxRunner port for isolated package installs
///
/// The engine does not care whether an implementation runs natively, in a
/// container or remotely. Whatever the exit path (success, failure,
/// timeout, cancellation) the environment is torn down before `execute`
/// returns.
#[async_trait]
pub trait SandboxRunner: Send + Sync {
    /// Runs the install for `request`, honouring `request.timeout` and `cancel`.
    ///
    /// # Errors
    /// [`SandboxError::Timeout`] and [`SandboxError::Cancelled`] after
    /// teardown; [`SandboxError::Spawn`] when the package manager is missing.
    /// A failed install is not an error: it is a non-zero `exit_code`.
    async fn execute(
        &self,
        request: &SandboxRequest,
        cancel: &CancelToken,
    ) -> Result<SandboxExecution, SandboxError>;

    /// Whether installs for `ecosystem` can be attempted
    fn supports(&self, ecosystem: Ecosystem) -> bool {
        ecosystem.has_registry()
    }
}
