use crate::compatibility::domain::{Component, Ecosystem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ManifestDependency {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// EcosystemManifest - normalized dependency list of one ecosystem,
/// handed to a runtime-only worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemManifest {
    pub ecosystem: Ecosystem,
    pub dependencies: Vec<ManifestDependency>,
}

impl EcosystemManifest {
    /// Builds the manifest from the components of `ecosystem`; entries are
    /// de-duplicated on (name, version) and sorted.
    pub fn from_components<'a, I>(ecosystem: Ecosystem, components: I) -> Self
    where
        I: IntoIterator<Item = &'a Component>,
    {
        let dependencies: BTreeSet<ManifestDependency> = components
            .into_iter()
            .filter(|c| c.ecosystem() == ecosystem)
            .map(|c| ManifestDependency {
                name: c.name().trim().to_string(),
                version: c.version().trim().to_string(),
            })
            .filter(|d| !d.name.is_empty())
            .collect();

        Self {
            ecosystem,
            dependencies: dependencies.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Components rebuilt from the manifest, tagged with their origin
    pub fn to_components(&self) -> Vec<Component> {
        self.dependencies
            .iter()
            .map(|d| {
                Component::new(d.name.clone(), d.version.clone(), self.ecosystem)
                    .with_property("source", "manifest")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_dedupes_and_sorts() {
        let components = vec![
            Component::new("requests", "2.31.0", Ecosystem::Pypi),
            Component::new("numpy", "1.26.0", Ecosystem::Pypi),
            Component::new("requests", "2.31.0 ", Ecosystem::Pypi),
            Component::new("lodash", "4.17.21", Ecosystem::Npm),
        ];
        let manifest = EcosystemManifest::from_components(Ecosystem::Pypi, &components);

        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.dependencies[0].name, "numpy");
        assert_eq!(manifest.dependencies[1].name, "requests");
    }

    #[test]
    fn test_manifest_round_trips_to_components() {
        let manifest = EcosystemManifest {
            ecosystem: Ecosystem::Gem,
            dependencies: vec![ManifestDependency {
                name: "nokogiri".to_string(),
                version: "1.15.4".to_string(),
            }],
        };
        let components = manifest.to_components();
        assert_eq!(components[0].ecosystem(), Ecosystem::Gem);
        assert_eq!(components[0].property("source"), Some("manifest"));
    }
}
