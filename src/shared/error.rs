use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish a clean inventory from one
/// that contains migration blockers, and both from tool failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - no incompatible components detected
    Success = 0,
    /// At least one component resolved to `incompatible`
    IncompatibleDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (invalid knowledge base, file I/O error, cancellation, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::IncompatibleDetected => write!(f, "Incompatible Components Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Run-level errors. Every variant aborts the analysis; per-component
/// problems never surface here.
#[derive(Debug, Error)]
pub enum CompatError {
    #[error("Invalid knowledge base: {path}\nReason: {reason}\n\n💡 Hint: Fix the entry and re-run; no components were analyzed")]
    KnowledgeBaseInvalid { path: PathBuf, reason: String },

    #[error("Invalid deny list: {path}\nReason: {reason}\n\n💡 Hint: Each deny_list entry needs a non-empty 'name' and a 'reason'")]
    DenyListInvalid { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    ConfigValidation { message: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}")]
    SecurityError { path: PathBuf, reason: String },

    #[error("Analysis cancelled before completion; all sandbox environments were torn down")]
    Cancelled,
}

/// Registry lookup failures. Never fatal: the verifier degrades them to `unknown`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("registry returned HTTP {0}")]
    HttpStatus(u16),

    #[error("could not parse registry response: {0}")]
    Parse(String),

    #[error("rejected package coordinates: {0}")]
    InvalidInput(String),
}

impl RegistryError {
    /// Transport failures and server-side errors are worth another attempt;
    /// malformed input or responses are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            RegistryError::Network(_) | RegistryError::Timeout(_) => true,
            RegistryError::HttpStatus(code) => *code == 429 || *code >= 500,
            RegistryError::Parse(_) | RegistryError::InvalidInput(_) => false,
        }
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RegistryError::Timeout(Duration::ZERO)
        } else if e.is_decode() {
            RegistryError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            RegistryError::HttpStatus(status.as_u16())
        } else {
            RegistryError::Network(e.to_string())
        }
    }
}

/// Sandbox execution failures. The environment has already been torn down
/// by the time any of these is returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SandboxError {
    #[error("sandbox execution exceeded {0:?}")]
    Timeout(Duration),

    #[error("sandbox execution cancelled")]
    Cancelled,

    #[error("failed to start sandbox command: {0}")]
    Spawn(String),

    #[error("refusing to build install command: {0}")]
    InvalidRequest(String),

    #[error("sandbox I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SandboxError {
    fn from(e: std::io::Error) -> Self {
        SandboxError::Io(e.to_string())
    }
}
