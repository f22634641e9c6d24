use crate::compatibility::domain::{
    CompatibilityStatus, InstallErrorType, TargetArchitecture, Version,
};

/// Confidence for the version that passed the sandbox
pub const PASSED_CONFIDENCE: f64 = 0.9;
/// Confidence for higher versions that inherit a pass
pub const INHERITED_CONFIDENCE: f64 = 0.8;
/// Confidence for lower versions that failed while a higher one passed
pub const UPGRADE_CONFIDENCE: f64 = 0.85;
/// Confidence when every tested version failed to install
pub const ALL_FAILED_CONFIDENCE: f64 = 0.85;
/// Confidence when the install succeeded but shipped only foreign binaries
pub const FOREIGN_BINARIES_CONFIDENCE: f64 = 0.6;
/// Confidence when the sandbox could not reach a verdict
pub const INCONCLUSIVE_CONFIDENCE: f64 = 0.2;

/// Verdict of one sandbox install
#[derive(Debug, Clone, PartialEq)]
pub enum SandboxVerdict {
    /// Installed; binaries (if any) run on the target
    Passed { native_binaries: bool },
    /// Installed, but every binary targets another architecture
    ForeignBinaries,
    /// The package itself failed to install
    Failed {
        error_type: InstallErrorType,
        details: String,
    },
    /// Timeout, cancellation, environment trouble; says nothing about the package
    Inconclusive {
        reason: String,
        error_type: Option<InstallErrorType>,
    },
}

/// One version of a package group and its verdict; `None` when not tested
#[derive(Debug, Clone, PartialEq)]
pub struct VersionTrial {
    pub version: String,
    pub verdict: Option<SandboxVerdict>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDecision {
    pub version: String,
    pub status: CompatibilityStatus,
    pub confidence: f64,
    pub notes: String,
    pub recommended_version: Option<String>,
    pub error_type: Option<InstallErrorType>,
}

/// VersionFallback - ordering and inheritance over a multi-version test group
///
/// Versions are tested ascending and testing stops at the first pass. The
/// passing version and every higher untested version are `compatible`;
/// lower versions that failed are `needs_upgrade` to the passing one. With
/// no pass, failed versions are `incompatible`.
pub struct VersionFallback;

impl VersionFallback {
    /// Splits versions into an ascending, de-duplicated sequence of
    /// comparable versions and the unparseable rest (in input order).
    pub fn order(versions: &[String]) -> (Vec<String>, Vec<String>) {
        let mut comparable: Vec<(Version, String)> = Vec::new();
        let mut unparseable: Vec<String> = Vec::new();

        for raw in versions {
            let raw = raw.trim();
            match Version::parse(raw) {
                Some(parsed) => comparable.push((parsed, raw.to_string())),
                None => {
                    if !unparseable.iter().any(|seen| seen == raw) {
                        unparseable.push(raw.to_string());
                    }
                }
            }
        }

        comparable.sort();
        comparable.dedup_by(|a, b| a.1 == b.1);
        (
            comparable.into_iter().map(|(_, raw)| raw).collect(),
            unparseable,
        )
    }

    /// Applies the inheritance rule to trials already in ascending order
    pub fn decide(trials: &[VersionTrial], target: TargetArchitecture) -> Vec<FallbackDecision> {
        let passing = trials
            .iter()
            .position(|t| matches!(t.verdict, Some(SandboxVerdict::Passed { .. })));

        trials
            .iter()
            .enumerate()
            .map(|(index, trial)| match passing {
                Some(p) => Self::decide_with_pass(trial, index.cmp(&p), &trials[p].version, target),
                None => Self::decide_without_pass(trial, target),
            })
            .collect()
    }

    fn decide_with_pass(
        trial: &VersionTrial,
        position: std::cmp::Ordering,
        passing_version: &str,
        target: TargetArchitecture,
    ) -> FallbackDecision {
        use std::cmp::Ordering;

        let decision = |status, confidence, notes: String| FallbackDecision {
            version: trial.version.clone(),
            status,
            confidence,
            notes,
            recommended_version: None,
            error_type: None,
        };

        match (position, &trial.verdict) {
            (Ordering::Equal, Some(SandboxVerdict::Passed { native_binaries })) => decision(
                CompatibilityStatus::Compatible,
                PASSED_CONFIDENCE,
                passed_note(*native_binaries, target),
            ),
            (Ordering::Greater, None) => decision(
                CompatibilityStatus::Compatible,
                INHERITED_CONFIDENCE,
                format!(
                    "Not tested; compatible by inheritance from version {}",
                    passing_version
                ),
            ),
            (_, Some(SandboxVerdict::Failed { error_type, details })) => FallbackDecision {
                recommended_version: Some(passing_version.to_string()),
                error_type: Some(*error_type),
                ..decision(
                    CompatibilityStatus::NeedsUpgrade,
                    UPGRADE_CONFIDENCE,
                    format!(
                        "Install failed ({}): {}; version {} installs on {}",
                        error_type, details, passing_version, target
                    ),
                )
            },
            (_, Some(SandboxVerdict::ForeignBinaries)) => FallbackDecision {
                recommended_version: Some(passing_version.to_string()),
                ..decision(
                    CompatibilityStatus::NeedsUpgrade,
                    UPGRADE_CONFIDENCE,
                    format!(
                        "Ships no {} binaries; version {} does",
                        target, passing_version
                    ),
                )
            },
            (_, Some(SandboxVerdict::Inconclusive { reason, error_type })) => FallbackDecision {
                recommended_version: Some(passing_version.to_string()),
                error_type: *error_type,
                ..decision(
                    CompatibilityStatus::Unknown,
                    INCONCLUSIVE_CONFIDENCE,
                    format!(
                        "Sandbox test inconclusive: {}; version {} installs on {}",
                        reason, passing_version, target
                    ),
                )
            },
            // Only the first pass stops the sequence, so any other verdict
            // here means a trial list that was not produced in order.
            (_, Some(SandboxVerdict::Passed { native_binaries })) => decision(
                CompatibilityStatus::Compatible,
                PASSED_CONFIDENCE,
                passed_note(*native_binaries, target),
            ),
            (_, None) => decision(
                CompatibilityStatus::Unknown,
                INCONCLUSIVE_CONFIDENCE,
                "Not tested".to_string(),
            ),
        }
    }

    fn decide_without_pass(trial: &VersionTrial, target: TargetArchitecture) -> FallbackDecision {
        let (status, confidence, notes, error_type) = match &trial.verdict {
            Some(SandboxVerdict::Failed {
                error_type,
                details,
            }) => (
                CompatibilityStatus::Incompatible,
                ALL_FAILED_CONFIDENCE,
                format!(
                    "Install failed ({}) and no tested version installs on {}: {}",
                    error_type, target, details
                ),
                Some(*error_type),
            ),
            Some(SandboxVerdict::ForeignBinaries) => (
                CompatibilityStatus::NeedsVerification,
                FOREIGN_BINARIES_CONFIDENCE,
                format!("Installed, but ships no {} binaries", target),
                None,
            ),
            Some(SandboxVerdict::Inconclusive { reason, error_type }) => (
                CompatibilityStatus::Unknown,
                INCONCLUSIVE_CONFIDENCE,
                format!("Sandbox test inconclusive: {}", reason),
                *error_type,
            ),
            Some(SandboxVerdict::Passed { native_binaries }) => (
                CompatibilityStatus::Compatible,
                PASSED_CONFIDENCE,
                passed_note(*native_binaries, target),
                None,
            ),
            None => (
                CompatibilityStatus::Unknown,
                INCONCLUSIVE_CONFIDENCE,
                "Not tested".to_string(),
                None,
            ),
        };

        FallbackDecision {
            version: trial.version.clone(),
            status,
            confidence,
            notes,
            recommended_version: None,
            error_type,
        }
    }
}

fn passed_note(native_binaries: bool, target: TargetArchitecture) -> String {
    if native_binaries {
        format!("Installed in sandbox; native binaries target {}", target)
    } else {
        "Installed in sandbox; no native binaries".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> Option<SandboxVerdict> {
        Some(SandboxVerdict::Failed {
            error_type: InstallErrorType::NativeBuild,
            details: "gcc failed".to_string(),
        })
    }

    fn trial(version: &str, verdict: Option<SandboxVerdict>) -> VersionTrial {
        VersionTrial {
            version: version.to_string(),
            verdict,
        }
    }

    #[test]
    fn test_order_ascending_with_unparseable_split() {
        let versions: Vec<String> = ["1.2", "1.10", "latest", "1.0", "1.2", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (ordered, rest) = VersionFallback::order(&versions);
        assert_eq!(ordered, vec!["1.0", "1.2", "1.10"]);
        assert_eq!(rest, vec!["latest", ""]);
    }

    #[test]
    fn test_lower_failures_need_upgrade() {
        let trials = vec![
            trial("1.0", failed()),
            trial("1.1", failed()),
            trial("1.2", Some(SandboxVerdict::Passed { native_binaries: true })),
        ];
        let decisions = VersionFallback::decide(&trials, TargetArchitecture::Arm64);
        let statuses: Vec<_> = decisions.iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![
                CompatibilityStatus::NeedsUpgrade,
                CompatibilityStatus::NeedsUpgrade,
                CompatibilityStatus::Compatible
            ]
        );
        assert_eq!(decisions[0].recommended_version.as_deref(), Some("1.2"));
        assert_eq!(decisions[0].error_type, Some(InstallErrorType::NativeBuild));
    }

    #[test]
    fn test_higher_untested_versions_inherit() {
        let trials = vec![
            trial("2.0", Some(SandboxVerdict::Passed { native_binaries: false })),
            trial("2.1", None),
            trial("3.0", None),
        ];
        let decisions = VersionFallback::decide(&trials, TargetArchitecture::Arm64);
        assert!(decisions.iter().all(|d| d.status == CompatibilityStatus::Compatible));
        assert_eq!(decisions[1].confidence, INHERITED_CONFIDENCE);
        assert!(decisions[2].notes.contains("inheritance from version 2.0"));
    }

    #[test]
    fn test_no_pass_marks_failures_incompatible() {
        let trials = vec![
            trial("1.0", failed()),
            trial("1.1", Some(SandboxVerdict::ForeignBinaries)),
            trial(
                "1.2",
                Some(SandboxVerdict::Inconclusive {
                    reason: "timed out after 90s".to_string(),
                    error_type: None,
                }),
            ),
        ];
        let decisions = VersionFallback::decide(&trials, TargetArchitecture::Arm64);
        assert_eq!(decisions[0].status, CompatibilityStatus::Incompatible);
        assert_eq!(decisions[1].status, CompatibilityStatus::NeedsVerification);
        assert_eq!(decisions[2].status, CompatibilityStatus::Unknown);
        assert!(decisions[2].notes.contains("timed out"));
    }

    #[test]
    fn test_foreign_binaries_below_pass_need_upgrade() {
        let trials = vec![
            trial("0.9", Some(SandboxVerdict::ForeignBinaries)),
            trial("1.0", Some(SandboxVerdict::Passed { native_binaries: true })),
        ];
        let decisions = VersionFallback::decide(&trials, TargetArchitecture::Arm64);
        assert_eq!(decisions[0].status, CompatibilityStatus::NeedsUpgrade);
        assert!(decisions[0].notes.contains("arm64"));
    }
}
