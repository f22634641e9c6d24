use super::HttpFetcher;
use crate::compatibility::domain::{RegistryLookup, RegistryMetadata};
use crate::ports::outbound::{PackageQuery, RegistryClient};
use crate::shared::error::RegistryError;
use crate::shared::security::validate_url_component;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://rubygems.org";

#[derive(Debug, Deserialize)]
struct GemVersion {
    number: String,
    #[serde(default = "default_platform")]
    platform: String,
}

fn default_platform() -> String {
    "ruby".to_string()
}

/// RubyGemsRegistryClient adapter for the RubyGems versions API
///
/// Precompiled gems are published per platform (`aarch64-linux`,
/// `x86_64-linux-gnu`); the `ruby` platform is the portable source gem.
pub struct RubyGemsRegistryClient {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl RubyGemsRegistryClient {
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
}

#[async_trait]
impl RegistryClient for RubyGemsRegistryClient {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
        validate_url_component(&query.name, "Package name")
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;
        let url = format!(
            "{}/api/v1/versions/{}.json",
            self.base_url,
            urlencoding::encode(&query.name)
        );

        match self.fetcher.get_json::<Vec<GemVersion>>(&url).await? {
            Some(versions) => Ok(platform_lookup(versions, &query.version)),
            None => Ok(RegistryLookup::NotFound),
        }
    }
}

fn platform_lookup(versions: Vec<GemVersion>, requested: &str) -> RegistryLookup {
    // the API lists newest first
    let wanted = if requested.is_empty() {
        match versions.first() {
            Some(newest) => newest.number.clone(),
            None => return RegistryLookup::NotFound,
        }
    } else {
        requested.to_string()
    };

    let mut metadata = RegistryMetadata {
        resolved_version: Some(wanted.clone()),
        ..Default::default()
    };
    let mut published = false;
    for version in versions.into_iter().filter(|v| v.number == wanted) {
        published = true;
        if version.platform == "ruby" {
            metadata.has_portable_artifact = true;
        } else if version.platform.contains("linux") {
            metadata.artifacts.push(version.platform);
        }
    }

    if published {
        RegistryLookup::Found(metadata)
    } else {
        RegistryLookup::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(json: &str) -> Vec<GemVersion> {
        serde_json::from_str(json).unwrap()
    }

    const NOKOGIRI: &str = r#"[
        {"number": "1.15.4", "platform": "aarch64-linux"},
        {"number": "1.15.4", "platform": "x86_64-linux"},
        {"number": "1.15.4", "platform": "arm64-darwin"},
        {"number": "1.15.4", "platform": "ruby"},
        {"number": "1.15.3", "platform": "ruby"}
    ]"#;

    #[test]
    fn test_platform_gems() {
        let RegistryLookup::Found(metadata) = platform_lookup(versions(NOKOGIRI), "1.15.4") else {
            panic!("expected Found");
        };
        assert!(metadata.has_portable_artifact);
        assert_eq!(metadata.artifacts, vec!["aarch64-linux", "x86_64-linux"]);
    }

    #[test]
    fn test_unpublished_version_is_not_found() {
        assert_eq!(
            platform_lookup(versions(NOKOGIRI), "0.0.1"),
            RegistryLookup::NotFound
        );
    }

    #[test]
    fn test_empty_version_uses_newest() {
        let RegistryLookup::Found(metadata) = platform_lookup(versions(NOKOGIRI), "") else {
            panic!("expected Found");
        };
        assert_eq!(metadata.resolved_version.as_deref(), Some("1.15.4"));
    }

    #[test]
    fn test_missing_platform_defaults_to_ruby() {
        let RegistryLookup::Found(metadata) =
            platform_lookup(versions(r#"[{"number": "7.0.0"}]"#), "7.0.0")
        else {
            panic!("expected Found");
        };
        assert!(metadata.has_portable_artifact);
    }
}
