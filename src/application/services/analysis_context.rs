use crate::compatibility::domain::{
    AnalysisResult, Component, ComponentKey, KnowledgeBase, TargetArchitecture,
};
use crate::compatibility::policies::FastPathTable;
use crate::compatibility::services::{
    ComponentNormalizer, KnowledgeBaseMatcher, MatchSettings, StatusResolver,
};
use std::sync::Arc;

/// AnalysisContext - everything loaded once at startup and read by every
/// component resolution of a run
///
/// Built before the first component is processed and never mutated
/// afterwards; workers share it by reference.
pub struct AnalysisContext {
    knowledge_base: Arc<KnowledgeBase>,
    normalizer: ComponentNormalizer,
    matcher: KnowledgeBaseMatcher,
    fast_path: FastPathTable,
    target: TargetArchitecture,
}

impl AnalysisContext {
    pub fn new(
        knowledge_base: Arc<KnowledgeBase>,
        normalizer: ComponentNormalizer,
        settings: MatchSettings,
        fast_path: FastPathTable,
        target: TargetArchitecture,
    ) -> Self {
        Self {
            knowledge_base,
            normalizer,
            matcher: KnowledgeBaseMatcher::new(settings),
            fast_path,
            target,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn fast_path(&self) -> &FastPathTable {
        &self.fast_path
    }

    pub fn target(&self) -> TargetArchitecture {
        self.target
    }

    pub fn key(&self, component: &Component) -> ComponentKey {
        self.normalizer.key(component)
    }

    /// Normalizer → matcher → status resolver for one component
    pub fn resolve_static(&self, component: &Component) -> AnalysisResult {
        let key = self.key(component);
        let matching_name = self
            .normalizer
            .normalize_name(component.name(), component.ecosystem());
        let outcome = self.matcher.find(&self.knowledge_base, &matching_name);
        let result = StatusResolver::resolve(component, key, &outcome);
        tracing::debug!(
            ecosystem = %result.key.ecosystem,
            package = %result.key.name,
            version = %result.key.version,
            status = %result.status,
            confidence = result.confidence,
            "static resolution"
        );
        result
    }

    /// Pairs each component with its identity key, preserving order
    pub fn keyed(&self, components: &[Component]) -> Vec<(ComponentKey, Component)> {
        components
            .iter()
            .map(|component| (self.key(component), component.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::{
        CompatibilityRecord, CompatibilityStatus, DenyListEntry, Ecosystem, VersionRange,
    };

    fn context() -> AnalysisContext {
        let mut builder = KnowledgeBase::builder();
        builder.add_record(
            CompatibilityRecord::new("nginx")
                .with_alias("nginx-core")
                .with_rule(
                    VersionRange::parse(">=1.18.0").unwrap(),
                    CompatibilityStatus::Compatible,
                    "Official arm64 packages",
                ),
        );
        builder.add_deny_entry(DenyListEntry::new("mssql-server", "No ARM64 build"));
        AnalysisContext::new(
            Arc::new(builder.build()),
            ComponentNormalizer::new([("mssql", "mssql-server")]),
            MatchSettings::default(),
            FastPathTable::empty(),
            TargetArchitecture::Arm64,
        )
    }

    #[test]
    fn test_resolve_static_uses_alias_map_and_deny_list() {
        let context = context();
        let result = context.resolve_static(&Component::new("MSSQL", "2019", Ecosystem::Os));
        assert_eq!(result.status, CompatibilityStatus::Incompatible);
        assert_eq!(result.key.name, "mssql-server");
    }

    #[test]
    fn test_resolve_static_is_deterministic() {
        let context = context();
        let component = Component::new("nginx-core", "1.20.2", Ecosystem::Os);
        let first = context.resolve_static(&component);
        let second = context.resolve_static(&component);
        assert_eq!(first, second);
        assert_eq!(first.status, CompatibilityStatus::Compatible);
    }
}
