use super::component::canonical_name;
use super::status::CompatibilityStatus;
use super::version_range::VersionRange;
use std::collections::HashMap;

/// One ordered rule inside a compatibility record
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRule {
    pub range: VersionRange,
    pub status: CompatibilityStatus,
    pub notes: String,
}

/// Knowledge base unit for one piece of software
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityRecord {
    /// Canonical name
    pub name: String,
    /// Canonical aliases
    pub aliases: Vec<String>,
    /// Evaluated in declared order; the first matching rule wins
    pub rules: Vec<VersionRule>,
    pub minimum_supported_version: Option<String>,
    pub recommended_version: Option<String>,
    pub alternatives: Vec<String>,
}

impl CompatibilityRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: canonical_name(name),
            aliases: Vec::new(),
            rules: Vec::new(),
            minimum_supported_version: None,
            recommended_version: None,
            alternatives: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        let alias = canonical_name(alias);
        if !alias.is_empty() && alias != self.name && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    pub fn with_rule(
        mut self,
        range: VersionRange,
        status: CompatibilityStatus,
        notes: impl Into<String>,
    ) -> Self {
        self.rules.push(VersionRule {
            range,
            status,
            notes: notes.into(),
        });
        self
    }

    pub fn with_minimum_supported_version(mut self, version: impl Into<String>) -> Self {
        self.minimum_supported_version = Some(version.into());
        self
    }

    pub fn with_recommended_version(mut self, version: impl Into<String>) -> Self {
        self.recommended_version = Some(version.into());
        self
    }

    pub fn with_alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// True when no rule constrains the version
    pub fn is_version_independent(&self) -> bool {
        self.rules.iter().all(|rule| rule.range.is_unconditional())
    }
}

/// Name that is incompatible regardless of version or knowledge base content
#[derive(Debug, Clone, PartialEq)]
pub struct DenyListEntry {
    pub name: String,
    pub aliases: Vec<String>,
    pub reason: String,
    pub minimum_supported_version: Option<String>,
    pub recommended_alternative: Option<String>,
}

impl DenyListEntry {
    pub fn new(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: canonical_name(name),
            aliases: Vec::new(),
            reason: reason.into(),
            minimum_supported_version: None,
            recommended_alternative: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        let alias = canonical_name(alias);
        if !alias.is_empty() && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    pub fn with_recommended_alternative(mut self, alternative: impl Into<String>) -> Self {
        self.recommended_alternative = Some(alternative.into());
        self
    }

    pub fn with_minimum_supported_version(mut self, version: impl Into<String>) -> Self {
        self.minimum_supported_version = Some(version.into());
        self
    }
}

/// Name or alias a fuzzy lookup can land on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyCandidate {
    pub name: String,
    pub record: usize,
}

/// Immutable, fully indexed knowledge base.
///
/// Built once at startup through [`KnowledgeBaseBuilder`] and shared
/// read-only (usually behind an `Arc`) by every matcher call in the run.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    records: Vec<CompatibilityRecord>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    deny_list: Vec<DenyListEntry>,
    deny_index: HashMap<String, usize>,
    fuzzy_candidates: Vec<FuzzyCandidate>,
}

impl KnowledgeBase {
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::default()
    }

    pub fn records(&self) -> &[CompatibilityRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&CompatibilityRecord> {
        self.records.get(index)
    }

    pub fn find_by_name(&self, canonical: &str) -> Option<&CompatibilityRecord> {
        self.by_name.get(canonical).map(|&i| &self.records[i])
    }

    pub fn find_by_alias(&self, canonical: &str) -> Option<&CompatibilityRecord> {
        self.by_alias.get(canonical).map(|&i| &self.records[i])
    }

    /// Deny-list lookup by canonical name or alias
    pub fn denied(&self, canonical: &str) -> Option<&DenyListEntry> {
        self.deny_index.get(canonical).map(|&i| &self.deny_list[i])
    }

    /// Every record name and alias, sorted alphabetically
    pub fn fuzzy_candidates(&self) -> &[FuzzyCandidate] {
        &self.fuzzy_candidates
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn deny_list_len(&self) -> usize {
        self.deny_list.len()
    }
}

/// Accumulates records and deny entries from any number of sources.
///
/// A record whose canonical name was already added replaces the earlier one
/// in place, so a custom knowledge base loaded after the built-in one
/// overrides it. Alias collisions resolve to the later record.
#[derive(Debug, Default)]
pub struct KnowledgeBaseBuilder {
    records: Vec<CompatibilityRecord>,
    positions: HashMap<String, usize>,
    /// Load sequence number per slot; an override bumps it
    loaded_at: Vec<usize>,
    loads: usize,
    deny_list: Vec<DenyListEntry>,
}

impl KnowledgeBaseBuilder {
    pub fn add_record(&mut self, record: CompatibilityRecord) -> &mut Self {
        self.loads += 1;
        match self.positions.get(&record.name) {
            Some(&position) => {
                self.records[position] = record;
                self.loaded_at[position] = self.loads;
            }
            None => {
                self.positions.insert(record.name.clone(), self.records.len());
                self.records.push(record);
                self.loaded_at.push(self.loads);
            }
        }
        self
    }

    pub fn add_deny_entry(&mut self, entry: DenyListEntry) -> &mut Self {
        self.deny_list.push(entry);
        self
    }

    pub fn build(self) -> KnowledgeBase {
        let mut by_name = HashMap::with_capacity(self.records.len());
        let mut by_alias = HashMap::new();

        for (index, record) in self.records.iter().enumerate() {
            by_name.insert(record.name.clone(), index);
        }

        let mut load_order: Vec<usize> = (0..self.records.len()).collect();
        load_order.sort_by_key(|&index| self.loaded_at[index]);
        for index in load_order {
            for alias in &self.records[index].aliases {
                by_alias.insert(alias.clone(), index);
            }
        }

        let mut fuzzy_candidates: Vec<FuzzyCandidate> = by_name
            .iter()
            .chain(by_alias.iter())
            .map(|(name, &record)| FuzzyCandidate {
                name: name.clone(),
                record,
            })
            .collect();
        fuzzy_candidates.sort_by(|a, b| a.name.cmp(&b.name).then(a.record.cmp(&b.record)));
        fuzzy_candidates.dedup_by(|a, b| a.name == b.name);

        let mut deny_index = HashMap::new();
        for (index, entry) in self.deny_list.iter().enumerate() {
            deny_index.insert(entry.name.clone(), index);
            for alias in &entry.aliases {
                deny_index.insert(alias.clone(), index);
            }
        }

        KnowledgeBase {
            records: self.records,
            by_name,
            by_alias,
            deny_list: self.deny_list,
            deny_index,
            fuzzy_candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nginx() -> CompatibilityRecord {
        CompatibilityRecord::new("nginx")
            .with_alias("nginx-core")
            .with_rule(
                VersionRange::parse(">=1.18.0").unwrap(),
                CompatibilityStatus::Compatible,
                "",
            )
    }

    #[test]
    fn test_record_names_are_canonical() {
        let record = CompatibilityRecord::new("Python_DateUtil").with_alias("DATEUTIL");
        assert_eq!(record.name, "python-dateutil");
        assert_eq!(record.aliases, vec!["dateutil".to_string()]);
    }

    #[test]
    fn test_alias_equal_to_name_is_dropped() {
        let record = CompatibilityRecord::new("nginx").with_alias("NGINX");
        assert!(record.aliases.is_empty());
    }

    #[test]
    fn test_lookup_by_name_and_alias() {
        let mut builder = KnowledgeBase::builder();
        builder.add_record(nginx());
        let kb = builder.build();

        assert_eq!(kb.len(), 1);
        assert!(kb.find_by_name("nginx").is_some());
        assert!(kb.find_by_name("nginx-core").is_none());
        assert_eq!(kb.find_by_alias("nginx-core").unwrap().name, "nginx");
    }

    #[test]
    fn test_later_record_overrides_earlier() {
        let mut builder = KnowledgeBase::builder();
        builder.add_record(nginx());
        builder.add_record(CompatibilityRecord::new("NGINX").with_rule(
            VersionRange::any(),
            CompatibilityStatus::NeedsVerification,
            "custom",
        ));
        let kb = builder.build();

        assert_eq!(kb.len(), 1);
        let record = kb.find_by_name("nginx").unwrap();
        assert_eq!(record.rules[0].status, CompatibilityStatus::NeedsVerification);
        assert!(kb.find_by_alias("nginx-core").is_none());
    }

    #[test]
    fn test_alias_collision_resolves_to_later_record() {
        let mut builder = KnowledgeBase::builder();
        builder.add_record(CompatibilityRecord::new("postgresql").with_alias("pg"));
        builder.add_record(CompatibilityRecord::new("pg-client").with_alias("pg"));
        let kb = builder.build();

        assert_eq!(kb.find_by_alias("pg").unwrap().name, "pg-client");
    }

    #[test]
    fn test_override_reclaims_alias() {
        let mut builder = KnowledgeBase::builder();
        builder.add_record(CompatibilityRecord::new("postgresql").with_alias("pg"));
        builder.add_record(CompatibilityRecord::new("pg-client").with_alias("pg"));
        builder.add_record(CompatibilityRecord::new("postgresql").with_alias("pg"));
        let kb = builder.build();

        assert_eq!(kb.len(), 2);
        assert_eq!(kb.find_by_alias("pg").unwrap().name, "postgresql");
    }

    #[test]
    fn test_deny_list_indexes_aliases() {
        let mut builder = KnowledgeBase::builder();
        builder.add_deny_entry(
            DenyListEntry::new("mssql-server", "x86-only").with_alias("Microsoft SQL Server"),
        );
        let kb = builder.build();

        assert_eq!(kb.deny_list_len(), 1);
        assert_eq!(kb.denied("mssql-server").unwrap().reason, "x86-only");
        assert!(kb.denied("microsoft-sql-server").is_some());
        assert!(kb.denied("postgresql").is_none());
    }

    #[test]
    fn test_fuzzy_candidates_sorted_and_unique() {
        let mut builder = KnowledgeBase::builder();
        builder.add_record(nginx());
        builder.add_record(CompatibilityRecord::new("apache-httpd").with_alias("httpd"));
        let kb = builder.build();

        let names: Vec<&str> = kb.fuzzy_candidates().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["apache-httpd", "httpd", "nginx", "nginx-core"]);
    }

    #[test]
    fn test_version_independent() {
        assert!(nginx().rules.len() == 1 && !nginx().is_version_independent());
        let record = CompatibilityRecord::new("curl").with_rule(
            VersionRange::any(),
            CompatibilityStatus::Compatible,
            "",
        );
        assert!(record.is_version_independent());
    }
}
