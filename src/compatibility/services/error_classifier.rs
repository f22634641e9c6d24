use crate::compatibility::domain::InstallErrorType;

/// Maximum length of the error excerpt kept on a result
const MAX_SNIPPET_CHARS: usize = 500;

const NETWORK_KEYWORDS: &[&str] = &[
    "could not resolve host",
    "connection refused",
    "connection reset",
    "connection timed out",
    "network is unreachable",
    "temporary failure in name resolution",
    "econnrefused",
    "econnreset",
    "etimedout",
    "enotfound",
    "eai_again",
    "ssl: certificate_verify_failed",
    "read timed out",
    "max retries exceeded",
    "unable to access",
];

const PERMISSION_KEYWORDS: &[&str] = &[
    "permission denied",
    "eacces",
    "eperm",
    "operation not permitted",
    "access is denied",
    "read-only file system",
];

const NATIVE_BUILD_KEYWORDS: &[&str] = &[
    "gcc",
    "g++",
    "clang",
    "cmake",
    "node-gyp",
    "gyp err",
    "failed building wheel",
    "building wheel for",
    "error: command",
    "compilation terminated",
    "fatal error:",
    "extconf.rb failed",
    "failed to build gem native extension",
    "make: ***",
    "unsupported architecture",
    "exec format error",
    "jni",
    ".so: cannot open shared object",
    "wrong elf class",
];

const DEPENDENCY_KEYWORDS: &[&str] = &[
    "could not find a version that satisfies",
    "no matching distribution",
    "resolutionimpossible",
    "conflicting dependencies",
    "eresolve",
    "unable to resolve dependency",
    "peer dep",
    "could not resolve dependencies",
    "could not find artifact",
    "nu1101",
    "nu1102",
    "nu1605",
    "could not find gem",
    "gem::dependencyerror",
    "dependency conflict",
];

/// InstallErrorClassifier - keyword heuristics over captured install output
///
/// Checked in order network, permissions, native build, dependency; the
/// first class with a hit wins, otherwise `unknown`. Case-insensitive.
pub struct InstallErrorClassifier;

impl InstallErrorClassifier {
    pub fn classify(output: &str) -> InstallErrorType {
        let text = output.to_lowercase();
        let hit = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

        if hit(NETWORK_KEYWORDS) {
            InstallErrorType::Network
        } else if hit(PERMISSION_KEYWORDS) {
            InstallErrorType::Permissions
        } else if hit(NATIVE_BUILD_KEYWORDS) {
            InstallErrorType::NativeBuild
        } else if hit(DEPENDENCY_KEYWORDS) {
            InstallErrorType::Dependency
        } else {
            InstallErrorType::Unknown
        }
    }

    /// Short excerpt of the most relevant output lines
    ///
    /// Prefers lines mentioning "error", falling back to the tail of the
    /// output. Truncated on a char boundary.
    pub fn snippet(output: &str) -> String {
        let error_lines: Vec<&str> = output
            .lines()
            .map(str::trim)
            .filter(|line| {
                let lower = line.to_lowercase();
                lower.contains("error") || lower.contains("failed")
            })
            .collect();

        let selected = if error_lines.is_empty() {
            let lines: Vec<&str> = output
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();
            lines[lines.len().saturating_sub(3)..].join(" | ")
        } else {
            error_lines[..error_lines.len().min(3)].join(" | ")
        };

        truncate_chars(&selected, MAX_SNIPPET_CHARS)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
