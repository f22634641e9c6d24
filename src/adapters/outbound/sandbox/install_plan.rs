use crate::compatibility::domain::{Ecosystem, TargetArchitecture};
use crate::ports::outbound::SandboxRequest;
use crate::shared::error::SandboxError;
use std::path::{Path, PathBuf};

/// Package-manager invocation for one sandboxed install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub program: String,
    pub args: Vec<String>,
    /// Files written into the sandbox root before running, relative to it
    pub files: Vec<(PathBuf, String)>,
}

impl InstallPlan {
    /// Builds the install/resolve command for `request`, confined to `root`.
    ///
    /// # Errors
    /// [`SandboxError::InvalidRequest`] for ecosystems without a package
    /// manager and for coordinates that could be read as options.
    pub fn for_request(
        request: &SandboxRequest,
        target: TargetArchitecture,
        root: &Path,
    ) -> Result<Self, SandboxError> {
        validate_token(&request.package, "package name")?;
        if !request.version.is_empty() {
            validate_token(&request.version, "version")?;
        }
        let name = request.package.as_str();
        let version = request.version.as_str();
        let root = root.display().to_string();

        let plan = match request.ecosystem {
            Ecosystem::Pypi => {
                let spec = if version.is_empty() {
                    name.to_string()
                } else {
                    format!("{}=={}", name, version)
                };
                Self::command(
                    "pip",
                    [
                        "install",
                        "--no-deps",
                        "--no-cache-dir",
                        "--disable-pip-version-check",
                        "--target",
                        &format!("{}/site-packages", root),
                        &spec,
                    ],
                )
            }
            Ecosystem::Npm => {
                let spec = if version.is_empty() {
                    name.to_string()
                } else {
                    format!("{}@{}", name, version)
                };
                Self::command(
                    "npm",
                    [
                        "install",
                        "--no-save",
                        "--no-audit",
                        "--no-fund",
                        "--ignore-scripts=false",
                        "--os",
                        "linux",
                        "--cpu",
                        target.npm_cpu(),
                        "--prefix",
                        &root,
                        &spec,
                    ],
                )
            }
            Ecosystem::Maven => {
                if version.is_empty() {
                    return Err(SandboxError::InvalidRequest(format!(
                        "Maven artifact {} needs an explicit version",
                        name
                    )));
                }
                Self::command(
                    "mvn",
                    [
                        "-B",
                        "-q",
                        "dependency:get",
                        &format!("-Dartifact={}:{}", name, version),
                        "-Dtransitive=false",
                        &format!("-Dmaven.repo.local={}/m2", root),
                    ],
                )
            }
            Ecosystem::Nuget => {
                let project = PathBuf::from("sandbox.csproj");
                let rid = target.dotnet_rid();
                let mut plan = Self::command(
                    "dotnet",
                    [
                        "restore",
                        &format!("{}/sandbox.csproj", root),
                        "--runtime",
                        rid,
                        "--packages",
                        &format!("{}/packages", root),
                    ],
                );
                plan.files.push((project, restore_project(name, version, rid)));
                plan
            }
            Ecosystem::Gem => {
                let mut plan = Self::command(
                    "gem",
                    [
                        "install",
                        name,
                        "--install-dir",
                        &format!("{}/gems", root),
                        "--no-document",
                        "--ignore-dependencies",
                    ],
                );
                if !version.is_empty() {
                    plan.args.push("--version".to_string());
                    plan.args.push(version.to_string());
                }
                plan
            }
            Ecosystem::Os | Ecosystem::Other => {
                return Err(SandboxError::InvalidRequest(format!(
                    "no package manager for {} components",
                    request.ecosystem
                )))
            }
        };
        Ok(plan)
    }

    fn command<'a>(program: &str, args: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(str::to_string).collect(),
            files: Vec::new(),
        }
    }
}

/// Rejects values a package manager could parse as an option or a second argument
fn validate_token(value: &str, what: &str) -> Result<(), SandboxError> {
    if value.is_empty() {
        return Err(SandboxError::InvalidRequest(format!("empty {}", what)));
    }
    if value.starts_with('-') {
        return Err(SandboxError::InvalidRequest(format!(
            "{} '{}' starts with '-'",
            what, value
        )));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '<' | '>' | '&' | ';'))
    {
        return Err(SandboxError::InvalidRequest(format!(
            "{} '{}' contains forbidden characters",
            what,
            value.escape_debug()
        )));
    }
    Ok(())
}

fn restore_project(name: &str, version: &str, rid: &str) -> String {
    let version = if version.is_empty() { "*" } else { version };
    format!(
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <RuntimeIdentifier>{rid}</RuntimeIdentifier>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="{name}" Version="{version}" />
  </ItemGroup>
</Project>
"#
    )
}
