use crate::compatibility::domain::{Ecosystem, RegistryLookup};
use crate::shared::Result;
use std::fmt;
use std::time::Duration;

/// Cache identity: (ecosystem, canonical name, version)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: String,
}

impl CacheKey {
    pub fn new(ecosystem: Ecosystem, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            ecosystem,
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.ecosystem, self.name, self.version)
    }
}

/// CacheStore port for registry lookup results that persist across runs
///
/// # Concurrency
/// Reads may run fully concurrently. A write to a key must be atomic:
/// readers observe either the previous entry or the complete new one,
/// never a partial value. Implementations own this guarantee.
pub trait CacheStore: Send + Sync {
    /// Returns the entry if present and not expired
    fn get(&self, key: &CacheKey) -> Option<RegistryLookup>;

    /// Stores an entry that expires after `ttl`
    fn set(&self, key: &CacheKey, value: &RegistryLookup, ttl: Duration) -> Result<()>;

    /// Removes an entry immediately
    fn expire(&self, key: &CacheKey) -> Result<()>;
}
