use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Failure class assigned to a sandbox install from its captured output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallErrorType {
    Network,
    Dependency,
    NativeBuild,
    Permissions,
    Unknown,
}

impl InstallErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallErrorType::Network => "network",
            InstallErrorType::Dependency => "dependency",
            InstallErrorType::NativeBuild => "native_build",
            InstallErrorType::Permissions => "permissions",
            InstallErrorType::Unknown => "unknown",
        }
    }

    /// Failures caused by the environment rather than the package
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            InstallErrorType::Network | InstallErrorType::Permissions
        )
    }
}

impl fmt::Display for InstallErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Architecture verdict over the compiled artifacts an install produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryCheck {
    /// Pure-source/bytecode package
    NoNativeBinaries,
    /// At least one binary targets the target architecture (or is universal)
    TargetCompatible,
    /// Every readable binary targets another architecture
    ForeignOnly,
    /// Native files were found but none could be parsed
    Unreadable,
}

/// Result of one sandbox install, folded into an `AnalysisResult` and then
/// discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeTestOutcome {
    pub exit_code: Option<i32>,
    pub binary_check: BinaryCheck,
    pub error_type: Option<InstallErrorType>,
    pub error_details: Option<String>,
    pub elapsed: Duration,
}

impl RuntimeTestOutcome {
    pub fn installed(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Installed and produced nothing that is foreign to the target
    pub fn passed(&self) -> bool {
        self.installed()
            && matches!(
                self.binary_check,
                BinaryCheck::NoNativeBinaries | BinaryCheck::TargetCompatible
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(exit_code: Option<i32>, binary_check: BinaryCheck) -> RuntimeTestOutcome {
        RuntimeTestOutcome {
            exit_code,
            binary_check,
            error_type: None,
            error_details: None,
            elapsed: Duration::from_secs(3),
        }
    }

    #[test]
    fn test_passed_requires_clean_install_and_target_binaries() {
        assert!(outcome(Some(0), BinaryCheck::NoNativeBinaries).passed());
        assert!(outcome(Some(0), BinaryCheck::TargetCompatible).passed());
        assert!(!outcome(Some(0), BinaryCheck::ForeignOnly).passed());
        assert!(!outcome(Some(0), BinaryCheck::Unreadable).passed());
        assert!(!outcome(Some(1), BinaryCheck::NoNativeBinaries).passed());
        assert!(!outcome(None, BinaryCheck::NoNativeBinaries).passed());
    }

    #[test]
    fn test_error_type_labels() {
        assert_eq!(InstallErrorType::NativeBuild.to_string(), "native_build");
        assert!(InstallErrorType::Network.is_environmental());
        assert!(!InstallErrorType::Dependency.is_environmental());
    }
}
