use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compatibility verdict for one component. Closed set: every resolved
/// component carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityStatus {
    Compatible,
    Incompatible,
    Unknown,
    NeedsUpgrade,
    NeedsVerification,
    NeedsVersionVerification,
}

impl CompatibilityStatus {
    pub const ALL: [CompatibilityStatus; 6] = [
        CompatibilityStatus::Compatible,
        CompatibilityStatus::Incompatible,
        CompatibilityStatus::Unknown,
        CompatibilityStatus::NeedsUpgrade,
        CompatibilityStatus::NeedsVerification,
        CompatibilityStatus::NeedsVersionVerification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityStatus::Compatible => "compatible",
            CompatibilityStatus::Incompatible => "incompatible",
            CompatibilityStatus::Unknown => "unknown",
            CompatibilityStatus::NeedsUpgrade => "needs_upgrade",
            CompatibilityStatus::NeedsVerification => "needs_verification",
            CompatibilityStatus::NeedsVersionVerification => "needs_version_verification",
        }
    }

    /// Whether the verdict is a conclusive answer rather than a request for
    /// more information.
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            CompatibilityStatus::Compatible
                | CompatibilityStatus::Incompatible
                | CompatibilityStatus::NeedsUpgrade
        )
    }
}

impl fmt::Display for CompatibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CompatibilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compatible" => Ok(CompatibilityStatus::Compatible),
            "incompatible" => Ok(CompatibilityStatus::Incompatible),
            "unknown" => Ok(CompatibilityStatus::Unknown),
            "needs_upgrade" => Ok(CompatibilityStatus::NeedsUpgrade),
            "needs_verification" => Ok(CompatibilityStatus::NeedsVerification),
            "needs_version_verification" => Ok(CompatibilityStatus::NeedsVersionVerification),
            _ => Err(format!("unrecognised compatibility status '{}'", s)),
        }
    }
}
