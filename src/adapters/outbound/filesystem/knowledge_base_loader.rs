use crate::compatibility::domain::{
    CompatibilityRecord, CompatibilityStatus, DenyListEntry, KnowledgeBase, VersionRange,
};
use crate::shared::error::CompatError;
use crate::shared::security::read_checked_file;
use crate::shared::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Legacy rule status that loads as `compatible` with its notes preserved
const COMPATIBLE_WITH_NOTES: &str = "compatible_with_notes";

#[derive(Debug, Deserialize)]
struct RawKnowledgeBase {
    software_compatibility: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    compatibility: RawCompatibility,
    #[serde(default)]
    minimum_supported_version: Option<String>,
    #[serde(default)]
    recommended_version: Option<String>,
    #[serde(default)]
    alternatives: Vec<RawAlternative>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCompatibility {
    #[serde(default)]
    supported_versions: Vec<RawRule>,
    #[serde(default)]
    minimum_supported_version: Option<String>,
    #[serde(default)]
    recommended_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(default)]
    version_range: String,
    status: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAlternative {
    Name(String),
    Detailed { name: String },
}

impl RawAlternative {
    fn into_name(self) -> String {
        match self {
            RawAlternative::Name(name) | RawAlternative::Detailed { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDenyList {
    deny_list: Vec<RawDenyEntry>,
}

#[derive(Debug, Deserialize)]
struct RawDenyEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    minimum_supported_version: Option<String>,
    #[serde(default)]
    recommended_alternative: Option<String>,
}

/// KnowledgeBaseLoader - builds the immutable knowledge base from disk
///
/// Sources are files or directories; a directory contributes every `*.json`
/// file in it, in file-name order. Records from later sources replace
/// earlier ones with the same canonical name. Any invalid entry aborts the
/// whole load.
pub struct KnowledgeBaseLoader;

impl KnowledgeBaseLoader {
    /// Loads every knowledge base and deny list source into one knowledge base
    ///
    /// # Errors
    /// [`CompatError::KnowledgeBaseInvalid`] / [`CompatError::DenyListInvalid`]
    /// naming the file and entry, or [`CompatError::FileReadError`]
    pub fn load(knowledge_bases: &[PathBuf], deny_lists: &[PathBuf]) -> Result<KnowledgeBase> {
        let mut builder = KnowledgeBase::builder();

        for path in expand_sources(knowledge_bases)? {
            let content = read_source(&path, "knowledge base")?;
            let records = Self::parse_knowledge_base(&content, &path)?;
            tracing::debug!(path = %path.display(), records = records.len(), "loaded knowledge base file");
            for record in records {
                builder.add_record(record);
            }
        }

        for path in expand_sources(deny_lists)? {
            let content = read_source(&path, "deny list")?;
            let entries = Self::parse_deny_list(&content, &path)?;
            tracing::debug!(path = %path.display(), entries = entries.len(), "loaded deny list file");
            for entry in entries {
                builder.add_deny_entry(entry);
            }
        }

        let knowledge_base = builder.build();
        tracing::info!(
            records = knowledge_base.len(),
            deny_entries = knowledge_base.deny_list_len(),
            "knowledge base ready"
        );
        Ok(knowledge_base)
    }

    pub fn parse_knowledge_base(
        content: &str,
        path: &Path,
    ) -> std::result::Result<Vec<CompatibilityRecord>, CompatError> {
        let invalid = |reason: String| CompatError::KnowledgeBaseInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let raw: RawKnowledgeBase =
            serde_json::from_str(content).map_err(|e| invalid(format!("invalid JSON: {}", e)))?;

        raw.software_compatibility
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                build_record(entry)
                    .map_err(|reason| invalid(format!("software_compatibility[{}]{}", index, reason)))
            })
            .collect()
    }

    pub fn parse_deny_list(
        content: &str,
        path: &Path,
    ) -> std::result::Result<Vec<DenyListEntry>, CompatError> {
        let invalid = |reason: String| CompatError::DenyListInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let raw: RawDenyList =
            serde_json::from_str(content).map_err(|e| invalid(format!("invalid JSON: {}", e)))?;

        raw.deny_list
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                if entry.name.trim().is_empty() {
                    return Err(invalid(format!("deny_list[{}].name must not be empty", index)));
                }
                if entry.reason.trim().is_empty() {
                    return Err(invalid(format!(
                        "deny_list[{}] ('{}') has no reason",
                        index, entry.name
                    )));
                }
                let mut deny = DenyListEntry::new(&entry.name, entry.reason.trim());
                for alias in &entry.aliases {
                    deny = deny.with_alias(alias);
                }
                if let Some(version) = non_empty(entry.minimum_supported_version) {
                    deny = deny.with_minimum_supported_version(version);
                }
                if let Some(alternative) = non_empty(entry.recommended_alternative) {
                    deny = deny.with_recommended_alternative(alternative);
                }
                Ok(deny)
            })
            .collect()
    }
}

/// Parses a rule status label, accepting the legacy `compatible_with_notes`
pub(crate) fn parse_status(label: &str) -> std::result::Result<CompatibilityStatus, String> {
    if label.trim().eq_ignore_ascii_case(COMPATIBLE_WITH_NOTES) {
        return Ok(CompatibilityStatus::Compatible);
    }
    label.parse()
}

fn build_record(raw: RawRecord) -> std::result::Result<CompatibilityRecord, String> {
    if raw.name.trim().is_empty() {
        return Err(".name must not be empty".to_string());
    }

    let mut record = CompatibilityRecord::new(&raw.name);
    for alias in &raw.aliases {
        record = record.with_alias(alias);
    }

    for (index, rule) in raw.compatibility.supported_versions.into_iter().enumerate() {
        let range = VersionRange::parse(&rule.version_range)
            .map_err(|e| format!(".compatibility.supported_versions[{}]: {}", index, e))?;
        let status = parse_status(&rule.status)
            .map_err(|e| format!(".compatibility.supported_versions[{}]: {}", index, e))?;
        record = record.with_rule(range, status, rule.notes);
    }

    let minimum = non_empty(raw.compatibility.minimum_supported_version)
        .or_else(|| non_empty(raw.minimum_supported_version));
    if let Some(version) = minimum {
        record = record.with_minimum_supported_version(version);
    }
    let recommended = non_empty(raw.compatibility.recommended_version)
        .or_else(|| non_empty(raw.recommended_version));
    if let Some(version) = recommended {
        record = record.with_recommended_version(version);
    }
    for alternative in raw.alternatives {
        record = record.with_alternative(alternative.into_name());
    }
    Ok(record)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_source(path: &Path, description: &str) -> Result<String> {
    read_checked_file(path, description).map_err(|e| {
        CompatError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        }
        .into()
    })
}

/// Files stay in the given order; directories expand to their `*.json`
/// files sorted by name.
fn expand_sources(sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for source in sources {
        if !source.is_dir() {
            files.push(source.clone());
            continue;
        }
        let entries = fs::read_dir(source).map_err(|e| CompatError::FileReadError {
            path: source.clone(),
            details: e.to_string(),
        })?;
        let mut json_files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        json_files.sort();
        files.extend(json_files);
    }
    Ok(files)
}
