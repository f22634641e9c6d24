use crate::adapters::outbound::cache::{FileCacheStore, InMemoryCacheStore};
use crate::adapters::outbound::network::{CachingRegistryClient, HttpFetcher, RegistryRouter};
use crate::adapters::outbound::sandbox::{DisabledSandbox, NativeSandboxRunner};
use crate::application::services::{
    AnalysisContext, RuntimePipeline, RuntimeVerifier, SandboxTester,
};
use crate::compatibility::domain::KnowledgeBase;
use crate::compatibility::policies::FastPathTable;
use crate::compatibility::services::ComponentNormalizer;
use crate::config::EngineSettings;
use crate::ports::outbound::{CacheStore, RegistryClient, SandboxRunner};
use crate::shared::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds the engine's services from validated settings
///
/// Network clients, the cache and the sandbox runner are only constructed
/// when a command actually needs them.
pub struct EngineFactory;

impl EngineFactory {
    pub fn analysis_context(
        settings: &EngineSettings,
        knowledge_base: KnowledgeBase,
        aliases: BTreeMap<String, String>,
        fast_path: FastPathTable,
    ) -> AnalysisContext {
        AnalysisContext::new(
            Arc::new(knowledge_base),
            ComponentNormalizer::new(aliases),
            settings.matching,
            fast_path,
            settings.target,
        )
    }

    /// File-backed when a cache directory is configured, process-local otherwise
    pub fn cache_store(settings: &EngineSettings) -> Result<Arc<dyn CacheStore>> {
        match &settings.cache_dir {
            Some(dir) => Ok(Arc::new(FileCacheStore::new(dir)?)),
            None => Ok(Arc::new(InMemoryCacheStore::new())),
        }
    }

    /// Public registries behind the TTL cache
    pub fn registry_client(settings: &EngineSettings) -> Result<Arc<dyn RegistryClient>> {
        let fetcher = Arc::new(HttpFetcher::new(
            settings.request_timeout,
            settings.max_retries,
        )?);
        let router = RegistryRouter::public_registries(fetcher);
        let store = Self::cache_store(settings)?;
        Ok(Arc::new(CachingRegistryClient::new(
            router,
            store,
            settings.cache_ttl,
        )))
    }

    pub fn sandbox_runner(settings: &EngineSettings, enabled: bool) -> Arc<dyn SandboxRunner> {
        if enabled {
            Arc::new(NativeSandboxRunner::new(settings.target))
        } else {
            Arc::new(DisabledSandbox)
        }
    }

    pub fn runtime_pipeline(
        settings: &EngineSettings,
        registry: Arc<dyn RegistryClient>,
        runner: Arc<dyn SandboxRunner>,
        fast_path: FastPathTable,
        use_sandbox: bool,
    ) -> RuntimePipeline {
        let verifier = RuntimeVerifier::new(
            registry,
            fast_path,
            settings.target,
            settings.runtime_concurrency,
        );
        let tester = use_sandbox.then(|| {
            SandboxTester::new(
                runner,
                settings.target,
                settings.sandbox_timeout,
                settings.sandbox_concurrency,
            )
        });
        RuntimePipeline::new(verifier, tester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::Ecosystem;
    use tempfile::TempDir;

    #[test]
    fn test_cache_store_selection() {
        let dir = TempDir::new().unwrap();
        let settings = EngineSettings {
            cache_dir: Some(dir.path().join("cache")),
            ..EngineSettings::default()
        };
        EngineFactory::cache_store(&settings).unwrap();
        assert!(dir.path().join("cache").is_dir());

        EngineFactory::cache_store(&EngineSettings::default()).unwrap();
    }

    #[test]
    fn test_sandbox_runner_selection() {
        let settings = EngineSettings::default();
        assert!(!EngineFactory::sandbox_runner(&settings, false).supports(Ecosystem::Npm));
        assert!(EngineFactory::sandbox_runner(&settings, true).supports(Ecosystem::Npm));
    }

    #[test]
    fn test_runtime_pipeline_sandbox_flag() {
        let settings = EngineSettings::default();
        let registry: Arc<dyn RegistryClient> = Arc::new(RegistryRouter::new());
        let pipeline = EngineFactory::runtime_pipeline(
            &settings,
            Arc::clone(&registry),
            Arc::new(DisabledSandbox),
            FastPathTable::empty(),
            false,
        );
        assert!(!pipeline.has_sandbox());

        let pipeline = EngineFactory::runtime_pipeline(
            &settings,
            registry,
            EngineFactory::sandbox_runner(&settings, true),
            FastPathTable::empty(),
            true,
        );
        assert!(pipeline.has_sandbox());
    }
}
