use crate::compatibility::domain::{
    canonical_name, package_identity, Component, ComponentKey, Ecosystem,
};
use std::collections::HashMap;

/// Architecture suffixes OS package managers append to package names
const OS_ARCH_SUFFIXES: &[&str] = &[
    ".x86_64", ".aarch64", ".noarch", ".i686", ".amd64", ".arm64", ":amd64", ":arm64", ":all",
];

/// ComponentNormalizer - turns raw inventory names into matching keys
///
/// Strips OS architecture suffixes, applies [`canonical_name`], then
/// substitutes through the alias map (e.g. a truncated SBOM name to the full
/// package name). Substitution is a single hop so a cyclic map cannot loop.
/// Never fails.
///
/// Matching names are folded for every ecosystem; component keys are not
/// (see [`package_identity`]).
#[derive(Debug, Clone, Default)]
pub struct ComponentNormalizer {
    /// canonical alias → full name as written in the alias map
    aliases: HashMap<String, String>,
}

impl ComponentNormalizer {
    pub fn new<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let aliases = aliases
            .into_iter()
            .map(|(from, to)| (canonical_name(from.as_ref()), to.as_ref().trim().to_string()))
            .filter(|(from, to)| {
                let target = canonical_name(to);
                !from.is_empty() && !target.is_empty() && *from != target
            })
            .collect();
        Self { aliases }
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Folded name used against the knowledge base, deny list and fast path
    pub fn normalize_name(&self, raw: &str, ecosystem: Ecosystem) -> String {
        let base = strip_for(raw, ecosystem);
        let canonical = canonical_name(&base);
        match self.aliases.get(&canonical) {
            Some(full) => canonical_name(full),
            None => canonical,
        }
    }

    /// Registry identity of the (alias-resolved) name
    pub fn identity(&self, raw: &str, ecosystem: Ecosystem) -> String {
        let base = strip_for(raw, ecosystem);
        match self.aliases.get(&canonical_name(&base)) {
            Some(full) => package_identity(ecosystem, full),
            None => package_identity(ecosystem, &base),
        }
    }

    pub fn key(&self, component: &Component) -> ComponentKey {
        ComponentKey::new(
            component.ecosystem(),
            self.identity(component.name(), component.ecosystem()),
            component.version(),
        )
    }
}

fn strip_for(raw: &str, ecosystem: Ecosystem) -> String {
    if ecosystem == Ecosystem::Os {
        strip_arch_suffix(&raw.trim().to_lowercase()).to_string()
    } else {
        raw.to_string()
    }
}

fn strip_arch_suffix(name: &str) -> &str {
    OS_ARCH_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|stripped| !stripped.is_empty())
        .unwrap_or(name)
}
