//! Configuration file support for arch-compat.
//!
//! Provides YAML-based configuration through `arch-compat.config.yml` files:
//! the raw file schema, loading and discovery, and [`EngineSettings`], the
//! validated values with defaults applied.

use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compatibility::domain::TargetArchitecture;
use crate::compatibility::services::{MatchSettings, DEFAULT_FUZZY_THRESHOLD};
use crate::shared::error::CompatError;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "arch-compat.config.yml";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RUNTIME_CONCURRENCY: usize = 8;
const DEFAULT_CACHE_TTL_HOURS: u64 = 24;
const DEFAULT_SANDBOX_TIMEOUT_SECS: u64 = 90;
const DEFAULT_SANDBOX_CONCURRENCY: usize = 2;
const MAX_RETRIES_LIMIT: u32 = 10;

type UnknownFields = BTreeMap<String, serde_yaml_ng::Value>;

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub target_architecture: Option<String>,
    #[serde(default)]
    pub matching: MatchingSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
    #[serde(default)]
    pub sandbox: SandboxSection,
    #[serde(default)]
    pub knowledge_base_files: Vec<PathBuf>,
    #[serde(default)]
    pub deny_list_files: Vec<PathBuf>,
    pub alias_file: Option<PathBuf>,
    pub fast_path_file: Option<PathBuf>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Deserialize, Default)]
pub struct MatchingSection {
    pub fuzzy_enabled: Option<bool>,
    pub fuzzy_threshold: Option<f64>,
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Deserialize, Default)]
pub struct RuntimeSection {
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub max_concurrency: Option<usize>,
    pub cache_ttl_hours: Option<u64>,
    pub cache_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Deserialize, Default)]
pub struct SandboxSection {
    pub enabled: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub max_concurrency: Option<usize>,
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    warn_unknown_fields(&config);
    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Dotted names of every key the schema does not know.
pub fn unknown_keys(config: &ConfigFile) -> Vec<String> {
    let sections: [(&str, &UnknownFields); 3] = [
        ("matching", &config.matching.unknown_fields),
        ("runtime", &config.runtime.unknown_fields),
        ("sandbox", &config.sandbox.unknown_fields),
    ];

    config
        .unknown_fields
        .keys()
        .cloned()
        .chain(sections.iter().flat_map(|(section, fields)| {
            fields.keys().map(move |key| format!("{}.{}", section, key))
        }))
        .collect()
}

fn warn_unknown_fields(config: &ConfigFile) {
    for key in unknown_keys(config) {
        tracing::warn!(field = %key, "unknown config field will be ignored");
    }
}

/// Validated engine settings: config file values with defaults applied.
///
/// CLI flags are applied on top by the caller before [`EngineSettings::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub target: TargetArchitecture,
    pub matching: MatchSettings,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub runtime_concurrency: usize,
    pub cache_ttl: Duration,
    pub cache_dir: Option<PathBuf>,
    pub sandbox_enabled: bool,
    pub sandbox_timeout: Duration,
    pub sandbox_concurrency: usize,
    pub knowledge_base_files: Vec<PathBuf>,
    pub deny_list_files: Vec<PathBuf>,
    pub alias_file: Option<PathBuf>,
    pub fast_path_file: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            target: TargetArchitecture::default(),
            matching: MatchSettings::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            runtime_concurrency: DEFAULT_RUNTIME_CONCURRENCY,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_HOURS * 3600),
            cache_dir: None,
            sandbox_enabled: false,
            sandbox_timeout: Duration::from_secs(DEFAULT_SANDBOX_TIMEOUT_SECS),
            sandbox_concurrency: DEFAULT_SANDBOX_CONCURRENCY,
            knowledge_base_files: Vec::new(),
            deny_list_files: Vec::new(),
            alias_file: None,
            fast_path_file: None,
        }
    }
}

impl EngineSettings {
    /// Applies the file over the defaults and validates the result.
    pub fn from_config(config: ConfigFile) -> Result<Self> {
        let defaults = Self::default();

        let target = match &config.target_architecture {
            Some(label) => label.parse().map_err(|message| CompatError::ConfigValidation { message })?,
            None => defaults.target,
        };

        let settings = Self {
            target,
            matching: MatchSettings {
                fuzzy_enabled: config.matching.fuzzy_enabled.unwrap_or(true),
                fuzzy_threshold: config
                    .matching
                    .fuzzy_threshold
                    .unwrap_or(DEFAULT_FUZZY_THRESHOLD),
            },
            request_timeout: config
                .runtime
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_retries: config.runtime.max_retries.unwrap_or(defaults.max_retries),
            runtime_concurrency: config
                .runtime
                .max_concurrency
                .unwrap_or(defaults.runtime_concurrency),
            cache_ttl: config
                .runtime
                .cache_ttl_hours
                .map(|hours| Duration::from_secs(hours.saturating_mul(3600)))
                .unwrap_or(defaults.cache_ttl),
            cache_dir: config.runtime.cache_dir,
            sandbox_enabled: config.sandbox.enabled.unwrap_or(defaults.sandbox_enabled),
            sandbox_timeout: config
                .sandbox
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.sandbox_timeout),
            sandbox_concurrency: config
                .sandbox
                .max_concurrency
                .unwrap_or(defaults.sandbox_concurrency),
            knowledge_base_files: config.knowledge_base_files,
            deny_list_files: config.deny_list_files,
            alias_file: config.alias_file,
            fast_path_file: config.fast_path_file,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// # Errors
    /// [`CompatError::ConfigValidation`] naming the first offending key
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| -> Result<()> {
            Err(CompatError::ConfigValidation { message }.into())
        };

        let threshold = self.matching.fuzzy_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return fail(format!(
                "matching.fuzzy_threshold must be in (0, 1], got {}",
                threshold
            ));
        }
        if !(1..=MAX_RETRIES_LIMIT).contains(&self.max_retries) {
            return fail(format!(
                "runtime.max_retries must be between 1 and {}, got {}",
                MAX_RETRIES_LIMIT, self.max_retries
            ));
        }
        if self.request_timeout.is_zero() {
            return fail("runtime.request_timeout_secs must be greater than 0".to_string());
        }
        if self.sandbox_timeout.is_zero() {
            return fail("sandbox.timeout_secs must be greater than 0".to_string());
        }
        if self.runtime_concurrency == 0 {
            return fail("runtime.max_concurrency must be at least 1".to_string());
        }
        if self.sandbox_concurrency == 0 {
            return fail("sandbox.max_concurrency must be at least 1".to_string());
        }
        Ok(())
    }
}
