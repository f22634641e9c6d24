use crate::compatibility::domain::RegistryLookup;
use crate::ports::outbound::{CacheKey, CacheStore};
use crate::shared::security::{validate_file_size, MAX_INPUT_FILE_SIZE};
use crate::shared::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    expires_at: DateTime<Utc>,
    value: RegistryLookup,
}

/// FileCacheStore - registry cache that persists across runs
///
/// One JSON document per key under the cache directory. Writes go to a
/// temporary file in the same directory which is then renamed over the
/// target, so a reader never observes a partially written entry.
/// Unreadable or corrupted entries count as misses.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Creates the store, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir
            .join(format!("{}.json", urlencoding::encode(&key.to_string())))
    }

    fn read_entry(path: &Path) -> Result<StoredEntry> {
        let size = fs::metadata(path)?.len();
        validate_file_size(size, path, MAX_INPUT_FILE_SIZE)?;
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &CacheKey) -> Option<RegistryLookup> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }
        match Self::read_entry(&path) {
            Ok(entry) if entry.expires_at > Utc::now() => Some(entry.value),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }

    fn set(&self, key: &CacheKey, value: &RegistryLookup, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl).context("cache TTL is out of range")?;
        let entry = StoredEntry {
            key: key.to_string(),
            expires_at: Utc::now() + ttl,
            value: value.clone(),
        };
        let json = serde_json::to_vec(&entry)?;

        let mut temp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file in {}", self.dir.display()))?;
        temp.write_all(&json)?;
        temp.flush()?;

        let path = self.entry_path(key);
        temp.persist(&path)
            .with_context(|| format!("Failed to persist cache entry {}", path.display()))?;
        Ok(())
    }

    fn expire(&self, key: &CacheKey) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::{Ecosystem, RegistryMetadata};
    use tempfile::TempDir;

    fn found() -> RegistryLookup {
        RegistryLookup::Found(RegistryMetadata {
            artifacts: vec!["aarch64-linux".into()],
            ..Default::default()
        })
    }

    #[test]
    fn test_entries_survive_a_new_store() {
        let temp_dir = TempDir::new().unwrap();
        let key = CacheKey::new(Ecosystem::Gem, "nokogiri", "1.15.4");

        FileCacheStore::new(temp_dir.path())
            .unwrap()
            .set(&key, &found(), Duration::from_secs(3600))
            .unwrap();

        let reopened = FileCacheStore::new(temp_dir.path()).unwrap();
        assert_eq!(reopened.get(&key), Some(found()));
    }

    #[test]
    fn test_key_with_separators_maps_to_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(temp_dir.path()).unwrap();
        let key = CacheKey::new(Ecosystem::Npm, "@types/node", "20.1.0");

        store.set(&key, &found(), Duration::from_secs(60)).unwrap();

        let files: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        assert_eq!(store.get(&key), Some(found()));
    }

    #[test]
    fn test_expired_and_corrupted_entries_are_misses() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(temp_dir.path()).unwrap();
        let expired = CacheKey::new(Ecosystem::Pypi, "six", "1.16.0");
        let corrupted = CacheKey::new(Ecosystem::Pypi, "idna", "3.4");

        store.set(&expired, &found(), Duration::ZERO).unwrap();
        fs::write(store.entry_path(&corrupted), "{not json").unwrap();

        assert_eq!(store.get(&expired), None);
        assert_eq!(store.get(&corrupted), None);
    }

    #[test]
    fn test_expire_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(temp_dir.path()).unwrap();
        let key = CacheKey::new(Ecosystem::Maven, "junit:junit", "4.13.2");

        store.set(&key, &found(), Duration::from_secs(60)).unwrap();
        store.expire(&key).unwrap();
        store.expire(&key).unwrap();
        assert_eq!(store.get(&key), None);
    }
}
