use arch_compat::compatibility::domain::{package_identity, RegistryLookup, RegistryMetadata};
use arch_compat::ports::outbound::{PackageQuery, RegistryClient};
use arch_compat::prelude::Ecosystem;
use arch_compat::shared::error::RegistryError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted RegistryClient that counts every lookup it receives
///
/// Unscripted packages answer `NotFound`.
#[derive(Default)]
pub struct MockRegistryClient {
    answers: HashMap<(Ecosystem, String), Result<RegistryLookup, RegistryError>>,
    calls: AtomicUsize,
    queried: Mutex<Vec<String>>,
}

impl MockRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, ecosystem: Ecosystem, name: &str, metadata: RegistryMetadata) -> Self {
        self.answers
            .insert((ecosystem, package_identity(ecosystem, name)), Ok(RegistryLookup::Found(metadata)));
        self
    }

    pub fn with_failure(mut self, ecosystem: Ecosystem, name: &str, error: RegistryError) -> Self {
        self.answers.insert((ecosystem, package_identity(ecosystem, name)), Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryClient for MockRegistryClient {
    async fn lookup(&self, query: &PackageQuery) -> Result<RegistryLookup, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queried
            .lock()
            .unwrap()
            .push(format!("{}@{}", query.identity, query.version));
        self.answers
            .get(&(query.ecosystem, query.identity.clone()))
            .cloned()
            .unwrap_or(Ok(RegistryLookup::NotFound))
    }
}
