use super::knowledge_base_loader::parse_status;
use crate::application::dto::{AnalysisReport, EcosystemManifest, PartialResultSet};
use crate::compatibility::domain::{Component, ComponentKey, Ecosystem};
use crate::compatibility::policies::{FastPathEntry, FastPathTable};
use crate::shared::error::CompatError;
use crate::shared::security::read_checked_file;
use crate::shared::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawInventory {
    Wrapped { components: Vec<RawComponent> },
    Bare(Vec<RawComponent>),
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default, alias = "type", alias = "package_type")]
    ecosystem: String,
    #[serde(default)]
    properties: BTreeMap<String, String>,
    #[serde(default)]
    parent: Option<ComponentKey>,
    #[serde(default)]
    children: Vec<ComponentKey>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPartial {
    Partial(PartialResultSet),
    Report(Box<AnalysisReport>),
}

#[derive(Debug, Deserialize)]
struct RawFastPathEntry {
    status: String,
    #[serde(default)]
    notes: String,
}

/// FileSystemReader - reads every JSON input the CLI accepts
///
/// Inventories, alias maps, fast-path tables, manifests and partial result
/// sets. Reads go through the size-capped regular-file check.
pub struct FileSystemReader;

impl FileSystemReader {
    /// Component inventory: `{"components": [...]}` or a bare array.
    /// Unrecognised ecosystem labels become `other`.
    pub fn read_components(path: &Path) -> Result<Vec<Component>> {
        let raw: RawInventory = read_json(path, "component inventory")?;
        let raw = match raw {
            RawInventory::Wrapped { components } | RawInventory::Bare(components) => components,
        };

        raw.into_iter()
            .enumerate()
            .map(|(index, entry)| {
                if entry.name.trim().is_empty() {
                    return Err(invalid_input(
                        path,
                        format!("components[{}].name must not be empty", index),
                    ));
                }
                let ecosystem = if entry.ecosystem.is_empty() {
                    Ecosystem::Other
                } else {
                    Ecosystem::from_label(&entry.ecosystem)
                };
                let mut component = Component::new(entry.name.trim(), entry.version.trim(), ecosystem);
                for (key, value) in entry.properties {
                    component = component.with_property(key, value);
                }
                if let Some(parent) = entry.parent {
                    component = component.with_parent(parent);
                }
                for child in entry.children {
                    component = component.with_child(child);
                }
                Ok(component)
            })
            .collect()
    }

    /// Alias map: a flat JSON object of alias → knowledge base name
    pub fn read_alias_map(path: &Path) -> Result<BTreeMap<String, String>> {
        read_json(path, "alias map")
    }

    /// Fast-path table: `{ecosystem: {package: {status, notes}}}`
    pub fn read_fast_path(path: &Path) -> Result<FastPathTable> {
        let raw: BTreeMap<String, BTreeMap<String, RawFastPathEntry>> =
            read_json(path, "fast-path table")?;

        let mut rows = Vec::new();
        for (label, packages) in raw {
            let ecosystem: Ecosystem = label
                .parse()
                .map_err(|e: String| invalid_input(path, e))?;
            for (name, entry) in packages {
                let status = parse_status(&entry.status)
                    .map_err(|e| invalid_input(path, format!("{}.{}: {}", label, name, e)))?;
                rows.push((
                    ecosystem,
                    name,
                    FastPathEntry {
                        status,
                        notes: entry.notes,
                    },
                ));
            }
        }
        Ok(FastPathTable::from_entries(rows))
    }

    pub fn read_manifest(path: &Path) -> Result<EcosystemManifest> {
        read_json(path, "manifest")
    }

    /// Partial result file, or a full analysis report read as a static partial
    pub fn read_partial_results(path: &Path) -> Result<PartialResultSet> {
        match read_json(path, "partial result file")? {
            RawPartial::Partial(partial) => Ok(partial),
            RawPartial::Report(report) => Ok(PartialResultSet::from_report(*report)),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, description: &str) -> Result<T> {
    let content = read_checked_file(path, description).map_err(|e| CompatError::FileReadError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    serde_json::from_str(&content)
        .map_err(|e| invalid_input(path, format!("invalid {} JSON: {}", description, e)))
}

fn invalid_input(path: &Path, details: String) -> anyhow::Error {
    CompatError::FileReadError {
        path: path.to_path_buf(),
        details,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::ResultStage;
    use crate::compatibility::domain::CompatibilityStatus;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_wrapped_and_bare_inventories() {
        let dir = TempDir::new().unwrap();
        let wrapped = write(
            &dir,
            "wrapped.json",
            r#"{"components": [
                {"name": "nginx", "version": "1.20.1", "ecosystem": "os"},
                {"name": "numpy", "version": "1.26.0", "type": "python", "properties": {"source": "requirements.txt"}}
            ]}"#,
        );
        let components = FileSystemReader::read_components(&wrapped).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].ecosystem(), Ecosystem::Os);
        assert_eq!(components[1].ecosystem(), Ecosystem::Pypi);
        assert_eq!(components[1].property("source"), Some("requirements.txt"));

        let bare = write(&dir, "bare.json", r#"[{"name": "left-pad", "ecosystem": "cobol"}]"#);
        let components = FileSystemReader::read_components(&bare).unwrap();
        assert_eq!(components[0].ecosystem(), Ecosystem::Other);
        assert_eq!(components[0].version(), "");
    }

    #[test]
    fn test_component_without_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.json", r#"[{"name": "ok"}, {"version": "1.0"}]"#);
        let error = FileSystemReader::read_components(&path).unwrap_err();
        assert!(error.to_string().contains("components[1]"));
    }

    #[test]
    fn test_read_alias_map() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "aliases.json", r#"{"pg": "postgresql", "k8s": "kubernetes"}"#);
        let aliases = FileSystemReader::read_alias_map(&path).unwrap();
        assert_eq!(aliases.get("pg").map(String::as_str), Some("postgresql"));
    }

    #[test]
    fn test_read_fast_path() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "fast.json",
            r#"{"pypi": {"Torch": {"status": "needs_verification", "notes": "CUDA wheels are x86 only"}}}"#,
        );
        let table = FileSystemReader::read_fast_path(&path).unwrap();
        let entry = table.lookup(Ecosystem::Pypi, "torch").unwrap();
        assert_eq!(entry.status, CompatibilityStatus::NeedsVerification);

        let bad = write(&dir, "bad.json", r#"{"cobol": {"x": {"status": "compatible"}}}"#);
        assert!(FileSystemReader::read_fast_path(&bad).is_err());
    }

    #[test]
    fn test_read_partial_results() {
        let dir = TempDir::new().unwrap();
        let partial = PartialResultSet::new(ResultStage::Runtime, Some(Ecosystem::Npm), Vec::new());
        let path = write(&dir, "npm.json", &serde_json::to_string(&partial).unwrap());
        let back = FileSystemReader::read_partial_results(&path).unwrap();
        assert_eq!(back.stage, ResultStage::Runtime);
        assert_eq!(back.ecosystem, Some(Ecosystem::Npm));
    }

    #[test]
    fn test_full_report_reads_as_static_partial() {
        let dir = TempDir::new().unwrap();
        let report = AnalysisReport::new(
            crate::compatibility::domain::TargetArchitecture::Arm64,
            Vec::new(),
            Vec::new(),
            std::time::Duration::ZERO,
        );
        let path = write(&dir, "report.json", &serde_json::to_string(&report).unwrap());
        let back = FileSystemReader::read_partial_results(&path).unwrap();
        assert_eq!(back.stage, ResultStage::Static);
        assert_eq!(back.run_id, report.run_id);
    }

    #[test]
    fn test_missing_file() {
        let error = FileSystemReader::read_manifest(Path::new("/nonexistent/m.json")).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CompatError>(),
            Some(CompatError::FileReadError { .. })
        ));
    }
}
