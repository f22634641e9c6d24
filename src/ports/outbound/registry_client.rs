use crate::compatibility::domain::{package_identity, Ecosystem, RegistryLookup};
use crate::shared::error::RegistryError;
use async_trait::async_trait;

/// Coordinates of one registry lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageQuery {
    pub ecosystem: Ecosystem,
    /// Name as the registry spells it (`org.xerial:sqlite-jdbc`, `@types/node`)
    pub name: String,
    /// Registry identity of the name, used for cache keys
    pub identity: String,
    pub version: String,
}

impl PackageQuery {
    pub fn new(ecosystem: Ecosystem, name: &str, version: &str) -> Self {
        Self {
            ecosystem,
            name: name.trim().to_string(),
            identity: package_identity(ecosystem, name),
            version: version.trim().to_string(),
        }
    }
}

/// RegistryClient port for package registry metadata
///
/// Implementations query one registry (or route between several) and
/// reduce the answer to architecture-relevant [`RegistryLookup`] facts.
///
/// # Errors
/// Transport failures, unexpected status codes and unparseable bodies are
/// returned as [`RegistryError`]. A package that does not exist is not an
/// error: it is `Ok(RegistryLookup::NotFound)`.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError>;
}
