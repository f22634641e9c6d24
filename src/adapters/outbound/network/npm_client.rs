use super::HttpFetcher;
use crate::compatibility::domain::{RegistryLookup, RegistryMetadata};
use crate::ports::outbound::{PackageQuery, RegistryClient};
use crate::shared::error::RegistryError;
use crate::shared::security::validate_url_component;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://registry.npmjs.org";

/// Lifecycle scripts that run at install time and usually compile addons
const INSTALL_SCRIPTS: &[&str] = &["preinstall", "install", "postinstall"];

#[derive(Debug, Deserialize)]
struct NpmVersionDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    cpu: Vec<String>,
    #[serde(default)]
    gypfile: bool,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
    #[serde(default, rename = "optionalDependencies")]
    optional_dependencies: BTreeMap<String, String>,
    /// node-pre-gyp download descriptor
    #[serde(default)]
    binary: Option<serde_json::Value>,
}

/// NpmRegistryClient adapter for the npm registry version document
pub struct NpmRegistryClient {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl NpmRegistryClient {
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

    fn version_url(&self, query: &PackageQuery) -> Result<String, RegistryError> {
        validate_url_component(&query.name, "Package name")
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
        let version = if query.version.is_empty() {
            "latest"
        } else {
            validate_url_component(&query.version, "Version")
                .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
            query.version.as_str()
        };

        // scoped packages keep the leading '@' and encode the separator
        let name = match query.name.strip_prefix('@') {
            Some(scoped) => format!("@{}", urlencoding::encode(scoped)),
            None => urlencoding::encode(&query.name).into_owned(),
        };
        Ok(format!(
            "{}/{}/{}",
            self.base_url,
            name,
            urlencoding::encode(version)
        ))
    }
}

#[async_trait]
impl RegistryClient for NpmRegistryClient {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
        let url = self.version_url(query)?;
        match self.fetcher.get_json::<NpmVersionDocument>(&url).await? {
            Some(document) => Ok(RegistryLookup::Found(version_metadata(document))),
            None => Ok(RegistryLookup::NotFound),
        }
    }
}

fn version_metadata(document: NpmVersionDocument) -> RegistryMetadata {
    let runs_install_script = INSTALL_SCRIPTS
        .iter()
        .any(|script| document.scripts.contains_key(*script));
    let requires_native_build = document.gypfile || runs_install_script || document.binary.is_some();

    // platform-specific optional packages (`@esbuild/linux-arm64`) are the
    // prebuilt binaries of the wrapper package
    let artifacts = document
        .optional_dependencies
        .into_keys()
        .filter(|name| is_platform_package(name))
        .collect();

    RegistryMetadata {
        resolved_version: document.version,
        artifacts,
        has_portable_artifact: !requires_native_build,
        requires_native_build,
        cpu_restrictions: document.cpu,
    }
}

fn is_platform_package(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    ["arm64", "aarch64", "x64", "x86_64", "amd64"]
        .iter()
        .any(|marker| name.contains(marker))
}
