use super::HttpFetcher;
use crate::compatibility::domain::{RegistryLookup, RegistryMetadata};
use crate::ports::outbound::{PackageQuery, RegistryClient};
use crate::shared::error::RegistryError;
use crate::shared::security::validate_url_component;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.nuget.org/v3-flatcontainer";

/// Linux runtime identifiers checked for runtime-specific companion packages
const LINUX_RIDS: &[&str] = &["linux-arm64", "linux-x64"];

#[derive(Debug, Deserialize)]
struct VersionIndex {
    #[serde(default)]
    versions: Vec<String>,
}

/// NuGetRegistryClient adapter for the NuGet v3 flat container
///
/// Native payloads ship as `runtime.<rid>.<id>` companion packages, so after
/// confirming the version exists the client checks one companion per Linux
/// RID. No companion at all means a managed-only package.
pub struct NuGetRegistryClient {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl NuGetRegistryClient {
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

    fn index_url(&self, package_id: &str) -> String {
        format!(
            "{}/{}/index.json",
            self.base_url,
            urlencoding::encode(&package_id.to_lowercase())
        )
    }

    async fn versions(&self, package_id: &str) -> Result<Option<Vec<String>>, RegistryError> {
        let index = self
            .fetcher
            .get_json::<VersionIndex>(&self.index_url(package_id))
            .await?;
        Ok(index.map(|i| i.versions))
    }
}

#[async_trait]
impl RegistryClient for NuGetRegistryClient {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
        validate_url_component(&query.name, "Package name")
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;

        let Some(versions) = self.versions(&query.name).await? else {
            return Ok(RegistryLookup::NotFound);
        };
        let Some(resolved) = resolve_version(&versions, &query.version) else {
            return Ok(RegistryLookup::NotFound);
        };

        let mut companions = Vec::new();
        for rid in LINUX_RIDS {
            let companion = format!("runtime.{}.{}", rid, query.name);
            if self.versions(&companion).await?.is_some() {
                companions.push(companion);
            }
        }

        Ok(RegistryLookup::Found(RegistryMetadata {
            resolved_version: Some(resolved),
            has_portable_artifact: companions.is_empty(),
            artifacts: companions,
            ..Default::default()
        }))
    }
}

/// Requested version if published (case-insensitive), or the newest one
/// when no version was requested.
fn resolve_version(published: &[String], requested: &str) -> Option<String> {
    if requested.is_empty() {
        return published.last().cloned();
    }
    published
        .iter()
        .find(|v| v.eq_ignore_ascii_case(requested))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_resolve_version() {
        let published = vec!["12.0.1".to_string(), "13.0.3".to_string(), "13.0.4-beta1".to_string()];
        assert_eq!(resolve_version(&published, "13.0.3").as_deref(), Some("13.0.3"));
        assert_eq!(resolve_version(&published, "13.0.4-BETA1").as_deref(), Some("13.0.4-beta1"));
        assert_eq!(resolve_version(&published, "").as_deref(), Some("13.0.4-beta1"));
        assert_eq!(resolve_version(&published, "1.0.0"), None);
        assert_eq!(resolve_version(&[], ""), None);
    }

    #[test]
    fn test_index_url_lowercases_id() {
        let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(5), 1).unwrap());
        let client = NuGetRegistryClient::new(fetcher);
        assert_eq!(
            client.index_url("Newtonsoft.Json"),
            "https://api.nuget.org/v3-flatcontainer/newtonsoft.json/index.json"
        );
    }

    #[test]
    fn test_version_index_parse() {
        let index: VersionIndex = serde_json::from_str(r#"{"versions": ["1.0.0", "1.1.0"]}"#).unwrap();
        assert_eq!(index.versions.len(), 2);
    }
}
