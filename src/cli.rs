use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use crate::compatibility::domain::TargetArchitecture;
use crate::config::EngineSettings;

/// Assess CPU architecture compatibility of a component inventory
#[derive(Parser, Debug)]
#[command(name = "arch-compat")]
#[command(version)]
#[command(
    about = "Resolve ARM64 readiness of dependency inventories from knowledge bases, registries and sandboxed installs",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a config file (defaults to ./arch-compat.config.yml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target architecture: arm64 (default) or x86_64
    #[arg(long, global = true, value_name = "ARCH")]
    pub target: Option<TargetArchitecture>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors and the final result
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a component inventory and write the full report
    Analyze(AnalyzeArgs),
    /// Write one dependency manifest per ecosystem plus the static results
    Manifest(ManifestArgs),
    /// Verify manifests against registries (and optionally sandboxes)
    Runtime(RuntimeArgs),
    /// Merge partial result files into one report
    Merge(MergeArgs),
}

/// Knowledge base, deny list and name-normalization sources
#[derive(ClapArgs, Debug, Default)]
pub struct SourceArgs {
    /// Knowledge base file or directory; later files override earlier ones
    #[arg(short = 'k', long = "knowledge-base", value_name = "PATH")]
    pub knowledge_bases: Vec<PathBuf>,

    /// Deny list file or directory
    #[arg(long = "deny-list", value_name = "PATH")]
    pub deny_lists: Vec<PathBuf>,

    /// Alias map JSON (truncated name → full name)
    #[arg(long, value_name = "FILE")]
    pub aliases: Option<PathBuf>,

    /// Fast-path table JSON replacing the built-in table
    #[arg(long, value_name = "FILE")]
    pub fast_path: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct AnalyzeArgs {
    /// Component inventory JSON
    pub input: PathBuf,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Verify components against package registries
    #[arg(long)]
    pub runtime: bool,

    /// Install-test components in a sandbox (implies --runtime)
    #[arg(long)]
    pub sandbox: bool,

    /// Exclude operating system packages
    #[arg(long)]
    pub no_system: bool,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ManifestArgs {
    /// Component inventory JSON
    pub input: PathBuf,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Directory receiving `<runtime>-manifest.json` files and `static-results.json`
    #[arg(long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Exclude operating system packages
    #[arg(long)]
    pub no_system: bool,
}

#[derive(ClapArgs, Debug)]
pub struct RuntimeArgs {
    /// Manifest files produced by `manifest`
    #[arg(required = true)]
    pub manifests: Vec<PathBuf>,

    /// Alias map JSON (truncated name → full name)
    #[arg(long, value_name = "FILE")]
    pub aliases: Option<PathBuf>,

    /// Fast-path table JSON replacing the built-in table
    #[arg(long, value_name = "FILE")]
    pub fast_path: Option<PathBuf>,

    /// Install-test dependencies in a sandbox
    #[arg(long)]
    pub sandbox: bool,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct MergeArgs {
    /// Partial result files or full reports
    #[arg(required = true)]
    pub partials: Vec<PathBuf>,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn log_level(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::INFO,
            _ => Level::DEBUG,
        }
    }

    /// Applies flags on top of file settings; flags win, list flags append
    pub fn apply_overrides(&self, settings: &mut EngineSettings) {
        if let Some(target) = self.target {
            settings.target = target;
        }

        let (sources, aliases, fast_path) = match &self.command {
            Command::Analyze(analyze) => (
                Some(&analyze.sources),
                analyze.sources.aliases.as_ref(),
                analyze.sources.fast_path.as_ref(),
            ),
            Command::Manifest(manifest) => (
                Some(&manifest.sources),
                manifest.sources.aliases.as_ref(),
                manifest.sources.fast_path.as_ref(),
            ),
            Command::Runtime(runtime) => (None, runtime.aliases.as_ref(), runtime.fast_path.as_ref()),
            Command::Merge(_) => (None, None, None),
        };

        if let Some(sources) = sources {
            settings
                .knowledge_base_files
                .extend(sources.knowledge_bases.iter().cloned());
            settings
                .deny_list_files
                .extend(sources.deny_lists.iter().cloned());
        }
        if let Some(path) = aliases {
            settings.alias_file = Some(path.clone());
        }
        if let Some(path) = fast_path {
            settings.fast_path_file = Some(path.clone());
        }
    }
}
