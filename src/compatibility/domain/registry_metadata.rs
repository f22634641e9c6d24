use serde::{Deserialize, Serialize};

/// Architecture-relevant facts extracted from a registry metadata document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMetadata {
    /// Version the registry answered for (may differ from the query for
    /// range-resolving registries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_version: Option<String>,
    /// Architecture-tagged artifacts: wheel filenames, gem platforms,
    /// runtime-specific package ids, classifiers
    #[serde(default)]
    pub artifacts: Vec<String>,
    /// A pure/universal artifact exists (`py3-none-any` wheel, `ruby`
    /// platform gem, plain jar)
    #[serde(default)]
    pub has_portable_artifact: bool,
    /// Installing compiles native code (sdist-only, `gypfile`, install scripts)
    #[serde(default)]
    pub requires_native_build: bool,
    /// Explicit CPU allow/deny list (npm `cpu`, `!arm64` means excluded)
    #[serde(default)]
    pub cpu_restrictions: Vec<String>,
}

/// Answer of one registry lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryLookup {
    Found(RegistryMetadata),
    /// Definitive: the registry has no such package/version
    NotFound,
    /// The ecosystem has no registry this tool can query
    Unsupported,
}

impl RegistryLookup {
    /// Whether the answer is stable enough to cache
    pub fn is_definitive(&self) -> bool {
        !matches!(self, RegistryLookup::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_tagging() {
        let found = RegistryLookup::Found(RegistryMetadata {
            artifacts: vec!["numpy-1.26.0-cp311-cp311-manylinux_2_17_aarch64.whl".into()],
            ..Default::default()
        });
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["kind"], "found");
        let back: RegistryLookup = serde_json::from_value(json).unwrap();
        assert_eq!(back, found);

        let json = serde_json::to_value(RegistryLookup::NotFound).unwrap();
        assert_eq!(json["kind"], "not_found");
    }

    #[test]
    fn test_unsupported_is_not_definitive() {
        assert!(RegistryLookup::NotFound.is_definitive());
        assert!(!RegistryLookup::Unsupported.is_definitive());
    }
}
