use super::HttpFetcher;
use crate::compatibility::domain::{RegistryLookup, RegistryMetadata};
use crate::ports::outbound::{PackageQuery, RegistryClient};
use crate::shared::error::RegistryError;
use crate::shared::security::validate_url_component;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://search.maven.org";

/// Classifier fragments of operating systems that are never a Linux deployment target
const NON_LINUX_CLASSIFIERS: &[&str] = &["osx", "darwin", "windows", "win32", "mingw"];

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "numFound")]
    num_found: u64,
    #[serde(default)]
    docs: Vec<ArtifactDoc>,
}

#[derive(Debug, Deserialize)]
struct ArtifactDoc {
    #[serde(default)]
    v: Option<String>,
    /// Published file suffixes: `.jar`, `-sources.jar`, `-linux-aarch_64.jar`, ...
    #[serde(default)]
    ec: Vec<String>,
}

/// MavenRegistryClient adapter for the Maven Central search API
///
/// Package names are `groupId:artifactId` coordinates. Architecture shows up
/// in published classifiers (`linux-aarch_64`, `linux-x86_64`).
pub struct MavenRegistryClient {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl MavenRegistryClient {
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

    fn search_url(&self, query: &PackageQuery) -> Result<String, RegistryError> {
        validate_url_component(&query.name, "Package name")
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
        let (group, artifact) = query
            .name
            .split_once(':')
            .filter(|(g, a)| !g.is_empty() && !a.is_empty() && !a.contains(':'))
            .ok_or_else(|| {
                RegistryError::InvalidInput(format!(
                    "Maven package '{}' is not a groupId:artifactId coordinate",
                    query.name
                ))
            })?;

        let mut solr = format!("g:\"{}\" AND a:\"{}\"", group, artifact);
        if !query.version.is_empty() {
            validate_url_component(&query.version, "Version")
                .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
            solr.push_str(&format!(" AND v:\"{}\"", query.version));
        }
        Ok(format!(
            "{}/solrsearch/select?q={}&core=gav&rows=1&wt=json",
            self.base_url,
            urlencoding::encode(&solr)
        ))
    }
}

#[async_trait]
impl RegistryClient for MavenRegistryClient {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
        let url = self.search_url(query)?;
        let Some(envelope) = self.fetcher.get_json::<SearchEnvelope>(&url).await? else {
            return Ok(RegistryLookup::NotFound);
        };
        Ok(search_lookup(envelope.response))
    }
}

fn search_lookup(response: SearchResponse) -> RegistryLookup {
    if response.num_found == 0 {
        return RegistryLookup::NotFound;
    }
    let Some(doc) = response.docs.into_iter().next() else {
        return RegistryLookup::NotFound;
    };

    let mut metadata = RegistryMetadata {
        resolved_version: doc.v,
        ..Default::default()
    };
    for suffix in doc.ec {
        if suffix == ".jar" {
            metadata.has_portable_artifact = true;
            continue;
        }
        let classifier = suffix.to_ascii_lowercase().replace("aarch_64", "aarch64");
        if NON_LINUX_CLASSIFIERS.iter().any(|os| classifier.contains(os)) {
            continue;
        }
        if ["aarch64", "arm64", "x86_64", "amd64"]
            .iter()
            .any(|marker| classifier.contains(marker))
        {
            metadata.artifacts.push(classifier);
        }
    }
    RegistryLookup::Found(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::Ecosystem;
    use std::time::Duration;

    fn parse(json: &str) -> RegistryLookup {
        let envelope: SearchEnvelope = serde_json::from_str(json).unwrap();
        search_lookup(envelope.response)
    }

    fn client() -> MavenRegistryClient {
        let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(5), 1).unwrap());
        MavenRegistryClient::new(fetcher)
    }

    #[test]
    fn test_native_classifiers() {
        let lookup = parse(
            r#"{"response": {"numFound": 1, "docs": [{
                "v": "4.1.100.Final",
                "ec": [".jar", "-sources.jar", "-linux-x86_64.jar", "-linux-aarch_64.jar", "-osx-aarch_64.jar"]
            }]}}"#,
        );
        let RegistryLookup::Found(metadata) = lookup else {
            panic!("expected Found");
        };
        assert!(metadata.has_portable_artifact);
        assert_eq!(
            metadata.artifacts,
            vec!["-linux-x86_64.jar".to_string(), "-linux-aarch64.jar".to_string()]
        );
    }

    #[test]
    fn test_zero_hits_is_not_found() {
        let lookup = parse(r#"{"response": {"numFound": 0, "docs": []}}"#);
        assert_eq!(lookup, RegistryLookup::NotFound);
    }

    #[test]
    fn test_search_url_requires_coordinates() {
        let query = PackageQuery::new(Ecosystem::Maven, "guava", "32.0.0");
        assert!(matches!(
            client().search_url(&query),
            Err(RegistryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let query = PackageQuery::new(Ecosystem::Maven, "org.xerial:sqlite-jdbc", "3.42.0.0");
        let url = client().search_url(&query).unwrap();
        assert!(url.starts_with("https://search.maven.org/solrsearch/select?q="));
        assert!(url.contains("sqlite-jdbc"));
        assert!(!url.contains(' '));
    }
}
