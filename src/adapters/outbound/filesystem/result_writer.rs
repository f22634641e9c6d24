use crate::application::dto::{EcosystemManifest, PartialResultSet};
use crate::ports::outbound::OutputPresenter;
use crate::shared::error::CompatError;
use crate::shared::Result;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// FileSystemWriter adapter - writes one document to a file
///
/// The content goes to a temporary file next to the target and is renamed
/// into place, so readers never observe a half-written report.
pub struct FileSystemWriter {
    output_path: PathBuf,
}

impl FileSystemWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    fn write_error(&self, details: impl Into<String>) -> anyhow::Error {
        CompatError::FileWriteError {
            path: self.output_path.clone(),
            details: details.into(),
        }
        .into()
    }

    fn parent_directory(&self) -> Result<&Path> {
        let parent = match self.output_path.parent() {
            Some(parent) if parent != Path::new("") => parent,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(self.write_error(format!(
                "Parent directory does not exist: {}",
                parent.display()
            )));
        }
        Ok(parent)
    }

    /// Refuses to replace a symbolic link
    fn validate_output_security(&self) -> Result<()> {
        match fs::symlink_metadata(&self.output_path) {
            Ok(metadata) if metadata.is_symlink() => Err(self.write_error(
                "Security: Output path is a symbolic link. Writing through symbolic links is not allowed.",
            )),
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_error(format!("Failed to read file metadata: {}", e))),
        }
    }
}

impl OutputPresenter for FileSystemWriter {
    fn present(&self, content: &str) -> Result<()> {
        let parent = self.parent_directory()?;
        self.validate_output_security()?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| self.write_error(e.to_string()))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| self.write_error(e.to_string()))?;
        temp.persist(&self.output_path)
            .map_err(|e| self.write_error(e.error.to_string()))?;

        tracing::debug!(path = %self.output_path.display(), bytes = content.len(), "wrote output file");
        Ok(())
    }
}

/// StdoutPresenter adapter - prints the document to stdout
#[derive(Default)]
pub struct StdoutPresenter;

impl StdoutPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputPresenter for StdoutPresenter {
    fn present(&self, content: &str) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            handle.write_all(b"\n")?;
        }
        handle.flush()?;
        Ok(())
    }
}

/// Serializes `value` as pretty JSON and hands it to `presenter`
pub fn present_json<T: Serialize>(presenter: &dyn OutputPresenter, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    presenter.present(&content)
}

/// Writes one `<runtime>-manifest.json` per manifest into `directory`,
/// creating it if needed. Returns the written paths in input order.
pub fn write_manifests(directory: &Path, manifests: &[EcosystemManifest]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(directory).map_err(|e| CompatError::FileWriteError {
        path: directory.to_path_buf(),
        details: e.to_string(),
    })?;

    manifests
        .iter()
        .map(|manifest| {
            let path = directory.join(manifest_file_name(manifest));
            present_json(&FileSystemWriter::new(path.clone()), manifest)?;
            Ok(path)
        })
        .collect()
}

/// File the manifest-only mode writes its static results to
pub const STATIC_RESULTS_FILE: &str = "static-results.json";

/// Writes the static-stage partial next to the manifests, ready for `merge`
pub fn write_static_partial(directory: &Path, partial: &PartialResultSet) -> Result<PathBuf> {
    fs::create_dir_all(directory).map_err(|e| CompatError::FileWriteError {
        path: directory.to_path_buf(),
        details: e.to_string(),
    })?;
    let path = directory.join(STATIC_RESULTS_FILE);
    present_json(&FileSystemWriter::new(path.clone()), partial)?;
    Ok(path)
}

pub fn manifest_file_name(manifest: &EcosystemManifest) -> String {
    format!("{}-manifest.json", manifest.ecosystem.runtime_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::{Component, Ecosystem};
    use tempfile::TempDir;

    #[test]
    fn test_write_and_replace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let writer = FileSystemWriter::new(path.clone());

        writer.present("first").unwrap();
        writer.present("second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_parent_directory() {
        let writer = FileSystemWriter::new(PathBuf::from("/nonexistent/dir/report.json"));
        let error = writer.present("{}").unwrap_err();
        assert!(error.to_string().contains("Parent directory does not exist"));
    }

    #[cfg(unix)]
    #[test]
    fn test_refuses_symlink_target() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.json");
        fs::write(&real, "original").unwrap();
        let link = dir.path().join("link.json");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let error = FileSystemWriter::new(link).present("{}").unwrap_err();
        assert!(error.to_string().contains("symbolic link"));
        assert_eq!(fs::read_to_string(&real).unwrap(), "original");
    }

    #[test]
    fn test_write_manifests() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("manifests");
        let components = [Component::new("numpy", "1.26.0", Ecosystem::Pypi)];
        let manifests = vec![
            EcosystemManifest::from_components(Ecosystem::Pypi, components.iter()),
            EcosystemManifest::from_components(Ecosystem::Nuget, std::iter::empty()),
        ];

        let written = write_manifests(&target, &manifests).unwrap();
        assert_eq!(written[0], target.join("python-manifest.json"));
        assert_eq!(written[1], target.join("dotnet-manifest.json"));

        let content = fs::read_to_string(&written[0]).unwrap();
        let back: EcosystemManifest = serde_json::from_str(&content).unwrap();
        assert_eq!(back.dependencies[0].name, "numpy");
    }

    #[test]
    fn test_write_static_partial() {
        use crate::application::dto::ResultStage;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("manifests");
        let partial = PartialResultSet::new(ResultStage::Static, None, Vec::new());

        let path = write_static_partial(&target, &partial).unwrap();
        assert_eq!(path, target.join(STATIC_RESULTS_FILE));

        let back: PartialResultSet =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.stage, ResultStage::Static);
        assert_eq!(back.run_id, partial.run_id);
    }
}
