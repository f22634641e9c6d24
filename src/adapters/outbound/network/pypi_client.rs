use super::HttpFetcher;
use crate::compatibility::domain::{RegistryLookup, RegistryMetadata};
use crate::ports::outbound::{PackageQuery, RegistryClient};
use crate::shared::error::RegistryError;
use crate::shared::security::validate_url_component;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://pypi.org";

#[derive(Debug, Deserialize)]
struct PyPiRelease {
    info: PyPiInfo,
    #[serde(default)]
    urls: Vec<PyPiFile>,
}

#[derive(Debug, Deserialize)]
struct PyPiInfo {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PyPiFile {
    filename: String,
    #[serde(default)]
    packagetype: String,
}

/// PyPiRegistryClient adapter for the PyPI JSON API
///
/// Reads the distribution files of one release. Wheel platform tags carry
/// the architecture (`manylinux_2_17_aarch64`, `win_amd64`, `none-any`).
pub struct PyPiRegistryClient {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl PyPiRegistryClient {
    pub fn new(fetcher: Arc<HttpFetcher>) -> Self {
        Self {
            fetcher,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn release_url(&self, query: &PackageQuery) -> Result<String, RegistryError> {
        validate_url_component(&query.name, "Package name")
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
        let name = urlencoding::encode(&query.name);
        if query.version.is_empty() {
            return Ok(format!("{}/pypi/{}/json", self.base_url, name));
        }
        validate_url_component(&query.version, "Version")
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
        Ok(format!(
            "{}/pypi/{}/{}/json",
            self.base_url,
            name,
            urlencoding::encode(&query.version)
        ))
    }
}

#[async_trait]
impl RegistryClient for PyPiRegistryClient {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
        let url = self.release_url(query)?;
        match self.fetcher.get_json::<PyPiRelease>(&url).await? {
            Some(release) => Ok(RegistryLookup::Found(release_metadata(release))),
            None => Ok(RegistryLookup::NotFound),
        }
    }
}

fn release_metadata(release: PyPiRelease) -> RegistryMetadata {
    let mut metadata = RegistryMetadata {
        resolved_version: release.info.version,
        ..Default::default()
    };

    // sdist-only releases leave every flag unset: they may be pure Python
    // or compile an extension, the file list cannot tell
    for file in release.urls.into_iter().filter(|f| f.packagetype == "bdist_wheel") {
        if is_portable_wheel(&file.filename) {
            metadata.has_portable_artifact = true;
        } else {
            metadata.artifacts.push(file.filename);
        }
    }
    metadata
}

fn is_portable_wheel(filename: &str) -> bool {
    filename
        .strip_suffix(".whl")
        .is_some_and(|stem| stem.ends_with("-none-any"))
}
