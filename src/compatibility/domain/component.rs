use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Package-management system a component belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Pypi,
    Npm,
    Maven,
    Nuget,
    Gem,
    Os,
    Other,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 7] = [
        Ecosystem::Pypi,
        Ecosystem::Npm,
        Ecosystem::Maven,
        Ecosystem::Nuget,
        Ecosystem::Gem,
        Ecosystem::Os,
        Ecosystem::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Pypi => "pypi",
            Ecosystem::Npm => "npm",
            Ecosystem::Maven => "maven",
            Ecosystem::Nuget => "nuget",
            Ecosystem::Gem => "gem",
            Ecosystem::Os => "os",
            Ecosystem::Other => "other",
        }
    }

    /// Language runtime label used for manifest and partial result file names
    pub fn runtime_label(&self) -> &'static str {
        match self {
            Ecosystem::Pypi => "python",
            Ecosystem::Npm => "nodejs",
            Ecosystem::Maven => "java",
            Ecosystem::Nuget => "dotnet",
            Ecosystem::Gem => "ruby",
            Ecosystem::Os => "system",
            Ecosystem::Other => "other",
        }
    }

    /// Whether the ecosystem has a package registry and an installer the
    /// runtime stage can drive
    pub fn has_registry(&self) -> bool {
        !matches!(self, Ecosystem::Os | Ecosystem::Other)
    }

    /// Lenient parse used for purl types and runtime labels. Total: anything
    /// unrecognised is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "pypi" | "python" | "pip" => Ecosystem::Pypi,
            "npm" | "nodejs" | "node" | "javascript" => Ecosystem::Npm,
            "maven" | "java" | "jar" => Ecosystem::Maven,
            "nuget" | "dotnet" | ".net" => Ecosystem::Nuget,
            "gem" | "ruby" | "rubygems" => Ecosystem::Gem,
            "os" | "system" | "deb" | "rpm" | "apk" | "alpm" => Ecosystem::Os,
            _ => Ecosystem::Other,
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Ecosystem::from_label(s) {
            Ecosystem::Other if !s.trim().eq_ignore_ascii_case("other") => Err(format!(
                "Invalid ecosystem: {}. Expected one of pypi, npm, maven, nuget, gem, os, other",
                s
            )),
            ecosystem => Ok(ecosystem),
        }
    }
}

/// Identity of a component across stages: ecosystem + [`package_identity`] + version.
///
/// Used for parent/child references and as the merge key for partial results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: String,
}

impl ComponentKey {
    pub fn new(ecosystem: Ecosystem, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            ecosystem,
            name: name.into(),
            version: version.into().trim().to_string(),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}:{}", self.ecosystem, self.name)
        } else {
            write!(f, "{}:{}@{}", self.ecosystem, self.name, self.version)
        }
    }
}

/// A single inventory entry as handed over by the inventory parser.
///
/// Immutable once built. Parent and child links are identity keys, so a
/// component never owns its relatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    name: String,
    #[serde(default)]
    version: String,
    ecosystem: Ecosystem,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<ComponentKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ComponentKey>,
}

impl Component {
    pub fn new(name: impl Into<String>, version: impl Into<String>, ecosystem: Ecosystem) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ecosystem,
            properties: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_parent(mut self, parent: ComponentKey) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_child(mut self, child: ComponentKey) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn parent(&self) -> Option<&ComponentKey> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[ComponentKey] {
        &self.children
    }
}

/// Characters stripped from both ends of a raw name
const TRIM_PUNCTUATION: &[char] = &[
    '"', '\'', '`', ',', ';', ':', '(', ')', '[', ']', '{', '}', '<', '>', '/', '\\', '-', '_',
    '.', '*', '!', '?',
];

/// Canonical matching form of a package name.
///
/// Lowercases, strips surrounding whitespace and punctuation, drops a trailing
/// `[extras]` block, and folds runs of `-`, `_`, `.` and whitespace into a
/// single `-`. Every other character is kept as-is, so the function is total.
pub fn canonical_name(raw: &str) -> String {
    let mut name = raw.trim();

    if let Some(open) = name.find('[') {
        if open > 0 && name.ends_with(']') {
            name = &name[..open];
        }
    }

    let name = name.trim_matches(|c: char| c.is_whitespace() || TRIM_PUNCTUATION.contains(&c));

    let mut canonical = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars() {
        if c == '-' || c == '_' || c == '.' || c.is_whitespace() {
            pending_separator = true;
            continue;
        }
        if pending_separator {
            canonical.push('-');
            pending_separator = false;
        }
        canonical.extend(c.to_lowercase());
    }

    canonical
}

/// Name under which a registry tells packages apart.
///
/// PyPI folds separators (PEP 503), so it shares [`canonical_name`]. The
/// other registries only ignore case: `lodash.merge` and `lodash-merge`
/// are different npm packages.
pub fn package_identity(ecosystem: Ecosystem, raw: &str) -> String {
    match ecosystem {
        Ecosystem::Pypi => canonical_name(raw),
        _ => raw.trim().to_lowercase(),
    }
}
