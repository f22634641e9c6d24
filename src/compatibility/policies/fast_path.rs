use crate::compatibility::domain::{canonical_name, CompatibilityStatus, Ecosystem};
use std::collections::HashMap;

/// Confidence of a curated fast-path answer
pub const FAST_PATH_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct FastPathEntry {
    pub status: CompatibilityStatus,
    pub notes: String,
}

/// Curated per-ecosystem answers that skip the registry entirely
#[derive(Debug, Clone, Default)]
pub struct FastPathTable {
    entries: HashMap<(Ecosystem, String), FastPathEntry>,
}

impl FastPathTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Ecosystem, String, FastPathEntry)>,
    {
        let entries = entries
            .into_iter()
            .map(|(ecosystem, name, entry)| ((ecosystem, canonical_name(&name)), entry))
            .collect();
        Self { entries }
    }

    /// Table shipped with the tool, used when no fast-path file is configured
    pub fn builtin() -> Self {
        let rows = BUILTIN.iter().flat_map(|(ecosystem, names, notes)| {
            names.iter().map(move |name| {
                (
                    *ecosystem,
                    name.to_string(),
                    FastPathEntry {
                        status: CompatibilityStatus::Compatible,
                        notes: notes.to_string(),
                    },
                )
            })
        });
        Self::from_entries(rows)
    }

    /// Lookup by name; the name is folded with [`canonical_name`] first
    pub fn lookup(&self, ecosystem: Ecosystem, name: &str) -> Option<&FastPathEntry> {
        self.entries.get(&(ecosystem, canonical_name(name)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type BuiltinRow = (Ecosystem, &'static [&'static str], &'static str);

const BUILTIN: &[BuiltinRow] = &[
    (
        Ecosystem::Pypi,
        &[
            "numpy",
            "pandas",
            "requests",
            "urllib3",
            "six",
            "setuptools",
            "pip",
            "boto3",
            "botocore",
            "pyyaml",
            "cryptography",
            "pillow",
        ],
        "Publishes manylinux aarch64 wheels or is pure Python",
    ),
    (
        Ecosystem::Npm,
        &[
            "lodash",
            "express",
            "react",
            "react-dom",
            "axios",
            "moment",
            "chalk",
            "commander",
            "debug",
            "uuid",
            "typescript",
            "esbuild",
        ],
        "Pure JavaScript or ships linux-arm64 optional binaries",
    ),
    (
        Ecosystem::Maven,
        &[
            "com.google.guava:guava",
            "org.apache.commons:commons-lang3",
            "com.fasterxml.jackson.core:jackson-databind",
            "org.slf4j:slf4j-api",
            "junit:junit",
            "org.springframework:spring-core",
            "org.apache.logging.log4j:log4j-core",
            "commons-io:commons-io",
            "com.google.code.gson:gson",
            "org.projectlombok:lombok",
            "ch.qos.logback:logback-classic",
            "org.yaml:snakeyaml",
        ],
        "Pure Java library; runs on any JVM architecture",
    ),
    (
        Ecosystem::Nuget,
        &[
            "Newtonsoft.Json",
            "Serilog",
            "AutoMapper",
            "Dapper",
            "NUnit",
            "xunit",
            "Moq",
            "FluentValidation",
            "Polly",
            "MediatR",
            "Microsoft.Extensions.Logging",
            "System.Text.Json",
        ],
        "Managed-only assembly; runs on linux-arm64",
    ),
    (
        Ecosystem::Gem,
        &[
            "rails",
            "rack",
            "json",
            "nokogiri",
            "puma",
            "bundler",
            "rake",
            "rspec",
            "sinatra",
            "activesupport",
            "thor",
            "i18n",
        ],
        "Pure Ruby or publishes aarch64-linux platform gems",
    ),
];
