use crate::compatibility::domain::RegistryLookup;
use crate::ports::outbound::{CacheKey, CacheStore, PackageQuery, RegistryClient};
use crate::shared::error::RegistryError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// CachingRegistryClient wraps a RegistryClient and adds a TTL cache.
///
/// Decorator over any client. Entries are keyed by
/// (ecosystem, package identity, version). Only definitive answers are stored:
/// errors and `Unsupported` always reach the inner client again. Two workers
/// missing on the same key at once both query the registry; the second write
/// simply replaces the first.
pub struct CachingRegistryClient<R: RegistryClient> {
    inner: R,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl<R: RegistryClient> CachingRegistryClient<R> {
    pub fn new(inner: R, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { inner, store, ttl }
    }

    fn cache_key(query: &PackageQuery) -> CacheKey {
        CacheKey::new(query.ecosystem, query.identity.clone(), query.version.clone())
    }
}

#[async_trait]
impl<R: RegistryClient> RegistryClient for CachingRegistryClient<R> {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
        let key = Self::cache_key(query);

        if let Some(cached) = self.store.get(&key) {
            tracing::debug!(key = %key, "registry cache hit");
            return Ok(cached);
        }

        let lookup = self.inner.lookup(query).await?;

        if lookup.is_definitive() {
            if let Err(e) = self.store.set(&key, &lookup, self.ttl) {
                tracing::warn!(key = %key, error = %e, "failed to write registry cache entry");
            }
        }

        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::cache::InMemoryCacheStore;
    use crate::compatibility::domain::{Ecosystem, RegistryMetadata};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock client that tracks call counts and answers from a script
    struct CountingClient {
        calls: AtomicUsize,
        answer: Result<RegistryLookup, RegistryError>,
    }

    impl CountingClient {
        fn answering(answer: Result<RegistryLookup, RegistryError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RegistryClient for CountingClient {
        async fn lookup(&self, _query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn caching(answer: Result<RegistryLookup, RegistryError>) -> CachingRegistryClient<CountingClient> {
        CachingRegistryClient::new(
            CountingClient::answering(answer),
            Arc::new(InMemoryCacheStore::new()),
            Duration::from_secs(3600),
        )
    }

    fn found() -> RegistryLookup {
        RegistryLookup::Found(RegistryMetadata {
            has_portable_artifact: true,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let client = caching(Ok(found()));
        let query = PackageQuery::new(Ecosystem::Pypi, "requests", "2.31.0");

        assert_eq!(client.lookup(&query).await, Ok(found()));
        assert_eq!(client.lookup(&query).await, Ok(found()));
        assert_eq!(client.inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_key_folds_pypi_names() {
        let client = caching(Ok(found()));
        client
            .lookup(&PackageQuery::new(Ecosystem::Pypi, "PyYAML", "6.0"))
            .await
            .unwrap();
        client
            .lookup(&PackageQuery::new(Ecosystem::Pypi, "pyyaml", "6.0"))
            .await
            .unwrap();
        assert_eq!(client.inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_npm_names_are_not_folded() {
        let client = caching(Ok(found()));
        client
            .lookup(&PackageQuery::new(Ecosystem::Npm, "lodash.merge", "4.6.2"))
            .await
            .unwrap();
        client
            .lookup(&PackageQuery::new(Ecosystem::Npm, "lodash-merge", "4.6.2"))
            .await
            .unwrap();
        assert_eq!(client.inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_versions_are_cached_separately() {
        let client = caching(Ok(RegistryLookup::NotFound));
        client
            .lookup(&PackageQuery::new(Ecosystem::Npm, "left-pad", "1.0.0"))
            .await
            .unwrap();
        client
            .lookup(&PackageQuery::new(Ecosystem::Npm, "left-pad", "1.3.0"))
            .await
            .unwrap();
        assert_eq!(client.inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let client = caching(Err(RegistryError::Network("reset".into())));
        let query = PackageQuery::new(Ecosystem::Gem, "nokogiri", "1.15.4");

        assert!(client.lookup(&query).await.is_err());
        assert!(client.lookup(&query).await.is_err());
        assert_eq!(client.inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_is_not_cached() {
        let client = caching(Ok(RegistryLookup::Unsupported));
        let query = PackageQuery::new(Ecosystem::Os, "openssl", "3.0.2");

        client.lookup(&query).await.unwrap();
        client.lookup(&query).await.unwrap();
        assert_eq!(client.inner.call_count(), 2);
    }
}
