use super::{
    HttpFetcher, MavenRegistryClient, NpmRegistryClient, NuGetRegistryClient, PyPiRegistryClient,
    RubyGemsRegistryClient,
};
use crate::compatibility::domain::{Ecosystem, RegistryLookup};
use crate::ports::outbound::{PackageQuery, RegistryClient};
use crate::shared::error::RegistryError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// RegistryRouter - dispatches each query to the client of its ecosystem
///
/// Ecosystems without a registered client (`os`, `other`) answer
/// [`RegistryLookup::Unsupported`] without any I/O.
#[derive(Default)]
pub struct RegistryRouter {
    clients: HashMap<Ecosystem, Arc<dyn RegistryClient>>,
}

impl RegistryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, ecosystem: Ecosystem, client: Arc<dyn RegistryClient>) -> Self {
        self.clients.insert(ecosystem, client);
        self
    }

    /// Router over the public registry of every supported ecosystem
    pub fn public_registries(fetcher: Arc<HttpFetcher>) -> Self {
        Self::new()
            .with_client(
                Ecosystem::Pypi,
                Arc::new(PyPiRegistryClient::new(Arc::clone(&fetcher))),
            )
            .with_client(
                Ecosystem::Npm,
                Arc::new(NpmRegistryClient::new(Arc::clone(&fetcher))),
            )
            .with_client(
                Ecosystem::Maven,
                Arc::new(MavenRegistryClient::new(Arc::clone(&fetcher))),
            )
            .with_client(
                Ecosystem::Nuget,
                Arc::new(NuGetRegistryClient::new(Arc::clone(&fetcher))),
            )
            .with_client(Ecosystem::Gem, Arc::new(RubyGemsRegistryClient::new(fetcher)))
    }

    pub fn supports(&self, ecosystem: Ecosystem) -> bool {
        self.clients.contains_key(&ecosystem)
    }
}

#[async_trait]
impl RegistryClient for RegistryRouter {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
        match self.clients.get(&query.ecosystem) {
            Some(client) => client.lookup(query).await,
            None => Ok(RegistryLookup::Unsupported),
        }
    }
}
