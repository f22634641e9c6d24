use crate::compatibility::domain::{
    CompatibilityStatus, Ecosystem, RegistryLookup, RegistryMetadata, TargetArchitecture,
};

/// Status derived from registry metadata
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryVerdict {
    pub status: CompatibilityStatus,
    pub confidence: f64,
    pub notes: String,
}

impl RegistryVerdict {
    fn new(status: CompatibilityStatus, confidence: f64, notes: impl Into<String>) -> Self {
        Self {
            status,
            confidence,
            notes: notes.into(),
        }
    }
}

/// RegistryRules policy - maps registry metadata to a compatibility status
///
/// Checked in order:
/// 1. absent from the registry → `incompatible`
/// 2. no registry for the ecosystem → `unknown`
/// 3. CPU allow-list excludes the target → `needs_verification`
/// 4. target-architecture artifact published → `compatible`
/// 5. portable artifact and no native build → `compatible`
/// 6. only foreign-architecture artifacts → `needs_verification`
/// 7. native build at install time → `needs_verification`
/// 8. anything else → `needs_verification`, low confidence
pub struct RegistryRules;

impl RegistryRules {
    pub fn evaluate(
        lookup: &RegistryLookup,
        ecosystem: Ecosystem,
        target: TargetArchitecture,
    ) -> RegistryVerdict {
        match lookup {
            RegistryLookup::NotFound => RegistryVerdict::new(
                CompatibilityStatus::Incompatible,
                0.8,
                format!("Not published on the {} registry", ecosystem),
            ),
            RegistryLookup::Unsupported => RegistryVerdict::new(
                CompatibilityStatus::Unknown,
                0.2,
                format!("No registry lookup available for {} packages", ecosystem),
            ),
            RegistryLookup::Found(metadata) => Self::evaluate_metadata(metadata, target),
        }
    }

    fn evaluate_metadata(metadata: &RegistryMetadata, target: TargetArchitecture) -> RegistryVerdict {
        if excludes_target(&metadata.cpu_restrictions, target) {
            return RegistryVerdict::new(
                CompatibilityStatus::NeedsVerification,
                0.7,
                format!(
                    "Package restricts CPUs to [{}]",
                    metadata.cpu_restrictions.join(", ")
                ),
            );
        }

        if let Some(artifact) = metadata
            .artifacts
            .iter()
            .find(|a| target.matches_artifact(a))
        {
            return RegistryVerdict::new(
                CompatibilityStatus::Compatible,
                0.85,
                format!("{} artifact published: {}", target, artifact),
            );
        }

        if metadata.has_portable_artifact && !metadata.requires_native_build {
            return RegistryVerdict::new(
                CompatibilityStatus::Compatible,
                0.8,
                "Architecture-independent artifact published",
            );
        }

        let foreign = metadata
            .artifacts
            .iter()
            .any(|a| target.is_foreign_artifact(a));
        if foreign && !metadata.has_portable_artifact {
            return RegistryVerdict::new(
                CompatibilityStatus::NeedsVerification,
                0.6,
                format!("Only non-{} binary artifacts are published", target),
            );
        }

        if metadata.requires_native_build {
            return RegistryVerdict::new(
                CompatibilityStatus::NeedsVerification,
                0.5,
                format!("Compiles native code at install time; build on {} to verify", target),
            );
        }

        RegistryVerdict::new(
            CompatibilityStatus::NeedsVerification,
            0.4,
            "Registry metadata does not indicate architecture support",
        )
    }
}

fn excludes_target(restrictions: &[String], target: TargetArchitecture) -> bool {
    if restrictions.is_empty() {
        return false;
    }
    let cpu = target.npm_cpu();
    let negated = format!("!{}", cpu);
    if restrictions.iter().any(|r| r.eq_ignore_ascii_case(&negated)) {
        return true;
    }
    let allowed: Vec<&String> = restrictions.iter().filter(|r| !r.starts_with('!')).collect();
    !allowed.is_empty() && !allowed.iter().any(|r| r.eq_ignore_ascii_case(cpu))
}
