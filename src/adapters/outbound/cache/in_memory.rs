use crate::compatibility::domain::RegistryLookup;
use crate::ports::outbound::{CacheKey, CacheStore};
use crate::shared::Result;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: RegistryLookup,
    expires_at: Instant,
}

/// InMemoryCacheStore - process-local cache backed by `DashMap`
///
/// Per-key inserts are atomic under the shard lock, so concurrent readers
/// see either the old or the new entry. Expired entries are dropped lazily
/// on read.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: DashMap<CacheKey, Entry>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &CacheKey) -> Option<RegistryLookup> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }
        // guard released above; removing while holding it would deadlock the shard
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    fn set(&self, key: &CacheKey, value: &RegistryLookup, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| anyhow::anyhow!("cache TTL {:?} is out of range", ttl))?;
        self.entries.insert(
            key.clone(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    fn expire(&self, key: &CacheKey) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::Ecosystem;

    fn key() -> CacheKey {
        CacheKey::new(Ecosystem::Pypi, "numpy", "1.26.0")
    }

    #[test]
    fn test_set_then_get() {
        let store = InMemoryCacheStore::new();
        store
            .set(&key(), &RegistryLookup::NotFound, Duration::from_secs(60))
            .unwrap();
        assert_eq!(store.get(&key()), Some(RegistryLookup::NotFound));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let store = InMemoryCacheStore::new();
        store
            .set(&key(), &RegistryLookup::NotFound, Duration::ZERO)
            .unwrap();
        assert_eq!(store.get(&key()), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_expire_removes_entry() {
        let store = InMemoryCacheStore::new();
        store
            .set(&key(), &RegistryLookup::NotFound, Duration::from_secs(60))
            .unwrap();
        store.expire(&key()).unwrap();
        assert_eq!(store.get(&key()), None);
    }

    #[test]
    fn test_concurrent_writers_leave_a_whole_entry() {
        let store = std::sync::Arc::new(InMemoryCacheStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .set(&key(), &RegistryLookup::NotFound, Duration::from_secs(60))
                            .unwrap();
                        assert_eq!(store.get(&key()), Some(RegistryLookup::NotFound));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 1);
    }
}
