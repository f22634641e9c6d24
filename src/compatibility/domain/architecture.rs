use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CPU architecture the inventory is being migrated to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetArchitecture {
    #[default]
    Arm64,
    X86_64,
}

impl TargetArchitecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArchitecture::Arm64 => "arm64",
            TargetArchitecture::X86_64 => "x86_64",
        }
    }

    /// Lowercase substrings that mark an artifact (wheel tag, gem platform,
    /// runtime identifier, classifier) as built for this architecture.
    pub fn artifact_markers(&self) -> &'static [&'static str] {
        match self {
            TargetArchitecture::Arm64 => &["aarch64", "arm64", "armv8"],
            TargetArchitecture::X86_64 => &["x86_64", "amd64", "x64", "win64"],
        }
    }

    /// Markers of the other architecture
    pub fn foreign_markers(&self) -> &'static [&'static str] {
        match self {
            TargetArchitecture::Arm64 => TargetArchitecture::X86_64.artifact_markers(),
            TargetArchitecture::X86_64 => TargetArchitecture::Arm64.artifact_markers(),
        }
    }

    /// npm `cpu` field value
    pub fn npm_cpu(&self) -> &'static str {
        match self {
            TargetArchitecture::Arm64 => "arm64",
            TargetArchitecture::X86_64 => "x64",
        }
    }

    /// .NET runtime identifier for Linux
    pub fn dotnet_rid(&self) -> &'static str {
        match self {
            TargetArchitecture::Arm64 => "linux-arm64",
            TargetArchitecture::X86_64 => "linux-x64",
        }
    }

    /// True when the lowercase artifact name carries a marker of this architecture
    pub fn matches_artifact(&self, artifact: &str) -> bool {
        let artifact = artifact.to_ascii_lowercase();
        self.artifact_markers().iter().any(|m| artifact.contains(m))
    }

    /// True when the artifact name carries a marker of the other architecture
    pub fn is_foreign_artifact(&self, artifact: &str) -> bool {
        let artifact = artifact.to_ascii_lowercase();
        self.foreign_markers().iter().any(|m| artifact.contains(m))
    }
}

impl fmt::Display for TargetArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetArchitecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arm64" | "aarch64" | "graviton" => Ok(TargetArchitecture::Arm64),
            "x86_64" | "amd64" | "x64" => Ok(TargetArchitecture::X86_64),
            _ => Err(format!(
                "Invalid target architecture: {}. Expected 'arm64' or 'x86_64'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("aarch64".parse(), Ok(TargetArchitecture::Arm64));
        assert_eq!("AMD64".parse(), Ok(TargetArchitecture::X86_64));
        assert!("riscv64".parse::<TargetArchitecture>().is_err());
    }

    #[test]
    fn test_artifact_markers() {
        let arm = TargetArchitecture::Arm64;
        assert!(arm.matches_artifact("numpy-1.26.0-cp311-cp311-manylinux_2_17_aarch64.whl"));
        assert!(arm.matches_artifact("nokogiri-1.15.4-arm64-darwin"));
        assert!(!arm.matches_artifact("numpy-1.26.0-cp311-cp311-manylinux_2_17_x86_64.whl"));
        assert!(arm.is_foreign_artifact("runtime.linux-x64.Microsoft.NETCore.App"));
    }

    #[test]
    fn test_default_is_arm64() {
        assert_eq!(TargetArchitecture::default(), TargetArchitecture::Arm64);
        assert_eq!(TargetArchitecture::Arm64.dotnet_rid(), "linux-arm64");
    }
}
