use arch_compat::adapters::outbound::console::{render_summary, StderrProgressReporter};
use arch_compat::adapters::outbound::filesystem::{
    present_json, write_manifests, write_static_partial, FileSystemReader, KnowledgeBaseLoader,
};
use arch_compat::application::dto::{AnalysisReport, AnalysisRequest, PartialResultSet};
use arch_compat::application::factories::{EngineFactory, PresenterFactory, PresenterType};
use arch_compat::application::use_cases::{
    AnalyzeComponentsUseCase, GenerateManifestsUseCase, MergeResultsUseCase, VerifyRuntimeUseCase,
};
use arch_compat::cli::{AnalyzeArgs, Args, Command, ManifestArgs, MergeArgs, RuntimeArgs};
use arch_compat::compatibility::domain::KnowledgeBase;
use arch_compat::compatibility::policies::FastPathTable;
use arch_compat::config::{discover_config, load_config_from_path, EngineSettings};
use arch_compat::ports::outbound::ProgressReporter;
use arch_compat::shared::error::ExitCode;
use arch_compat::shared::telemetry::init_tracing;
use arch_compat::shared::{CancelToken, CancellationSignal, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

/// Used when neither the config nor the flags name any source
const DEFAULT_KNOWLEDGE_BASE_DIR: &str = "knowledge_bases";
const DEFAULT_DENY_LIST_DIR: &str = "deny_lists";

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::InvalidArguments
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            process::exit(code.as_i32());
        }
    };

    init_tracing(args.log_json, args.log_level());

    let signal = CancellationSignal::new();
    let interrupt = signal.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling run");
            interrupt.cancel();
        }
    });

    match run(&args, signal.token()).await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

async fn run(args: &Args, cancel: CancelToken) -> Result<ExitCode> {
    let settings = load_settings(args)?;
    let reporter = progress_reporter(args.quiet);

    match &args.command {
        Command::Analyze(analyze) => {
            let report = run_analyze(analyze, &settings, reporter, &cancel).await?;
            finish_report(&report, analyze.output.clone(), args.quiet)
        }
        Command::Manifest(manifest) => {
            run_manifest(manifest, &settings, reporter, args.quiet, &cancel).await
        }
        Command::Runtime(runtime) => run_runtime(runtime, &settings, reporter, &cancel).await,
        Command::Merge(merge) => {
            let report = run_merge(merge, &settings, reporter)?;
            finish_report(&report, merge.output.clone(), args.quiet)
        }
    }
}

fn progress_reporter(quiet: bool) -> StderrProgressReporter {
    if quiet {
        StderrProgressReporter::quiet()
    } else {
        StderrProgressReporter::new()
    }
}

fn load_settings(args: &Args) -> Result<EngineSettings> {
    let config = match &args.config {
        Some(path) => Some(load_config_from_path(path)?),
        None => discover_config(Path::new("."))?,
    };

    let mut settings = match config {
        Some(config) => EngineSettings::from_config(config)?,
        None => EngineSettings::default(),
    };
    args.apply_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn sources_or_default(configured: &[PathBuf], default_dir: &str) -> Vec<PathBuf> {
    if configured.is_empty() && Path::new(default_dir).is_dir() {
        vec![PathBuf::from(default_dir)]
    } else {
        configured.to_vec()
    }
}

fn load_knowledge_base<PR: ProgressReporter>(
    settings: &EngineSettings,
    reporter: &PR,
) -> Result<KnowledgeBase> {
    let knowledge_bases =
        sources_or_default(&settings.knowledge_base_files, DEFAULT_KNOWLEDGE_BASE_DIR);
    let deny_lists = sources_or_default(&settings.deny_list_files, DEFAULT_DENY_LIST_DIR);

    let knowledge_base = KnowledgeBaseLoader::load(&knowledge_bases, &deny_lists)?;
    if knowledge_base.is_empty() {
        reporter.report_error(
            "⚠️  Warning: No knowledge base records loaded; static resolution will report every component as unknown",
        );
    } else {
        reporter.report(&format!(
            "📚 Loaded {} knowledge base record(s) and {} deny list entr(ies)",
            knowledge_base.len(),
            knowledge_base.deny_list_len()
        ));
    }
    Ok(knowledge_base)
}

fn load_aliases(settings: &EngineSettings) -> Result<BTreeMap<String, String>> {
    match &settings.alias_file {
        Some(path) => FileSystemReader::read_alias_map(path),
        None => Ok(BTreeMap::new()),
    }
}

fn load_fast_path(settings: &EngineSettings) -> Result<FastPathTable> {
    match &settings.fast_path_file {
        Some(path) => FileSystemReader::read_fast_path(path),
        None => Ok(FastPathTable::builtin()),
    }
}

async fn run_analyze(
    analyze: &AnalyzeArgs,
    settings: &EngineSettings,
    reporter: StderrProgressReporter,
    cancel: &CancelToken,
) -> Result<AnalysisReport> {
    let components = FileSystemReader::read_components(&analyze.input)?;
    reporter.report(&format!(
        "📖 Read {} component(s) from {}",
        components.len(),
        analyze.input.display()
    ));

    let knowledge_base = load_knowledge_base(settings, &reporter)?;
    let fast_path = load_fast_path(settings)?;
    let use_sandbox = analyze.sandbox || (analyze.runtime && settings.sandbox_enabled);
    let use_runtime = analyze.runtime || use_sandbox;

    let pipeline = if use_runtime {
        let registry = EngineFactory::registry_client(settings)?;
        let runner = EngineFactory::sandbox_runner(settings, use_sandbox);
        Some(EngineFactory::runtime_pipeline(
            settings,
            registry,
            runner,
            fast_path.clone(),
            use_sandbox,
        ))
    } else {
        None
    };

    let context =
        EngineFactory::analysis_context(settings, knowledge_base, load_aliases(settings)?, fast_path);
    let use_case = AnalyzeComponentsUseCase::new(context, pipeline, reporter);
    let request = AnalysisRequest::new(components)
        .with_runtime(use_runtime)
        .with_sandbox(use_sandbox)
        .with_exclude_system(analyze.no_system);

    use_case.execute(request, cancel).await
}

/// Writes one manifest per registry ecosystem plus the static partial for
/// the same inventory, so runtime partials can later be merged with it
async fn run_manifest(
    manifest: &ManifestArgs,
    settings: &EngineSettings,
    reporter: StderrProgressReporter,
    quiet: bool,
    cancel: &CancelToken,
) -> Result<ExitCode> {
    let components = FileSystemReader::read_components(&manifest.input)?;
    let request = AnalysisRequest::new(components).with_exclude_system(manifest.no_system);

    let manifests = GenerateManifestsUseCase::new(reporter).execute(request.clone())?;
    let mut written = write_manifests(&manifest.output_dir, &manifests)?;

    let reporter = progress_reporter(quiet);
    let knowledge_base = load_knowledge_base(settings, &reporter)?;
    let context = EngineFactory::analysis_context(
        settings,
        knowledge_base,
        load_aliases(settings)?,
        load_fast_path(settings)?,
    );
    let report = AnalyzeComponentsUseCase::new(context, None, reporter)
        .execute(request, cancel)
        .await?;
    written.push(write_static_partial(
        &manifest.output_dir,
        &PartialResultSet::from_report(report),
    )?);

    if !quiet {
        for path in written {
            eprintln!("✅ Wrote {}", path.display());
        }
    }
    Ok(ExitCode::Success)
}

async fn run_runtime(
    runtime: &RuntimeArgs,
    settings: &EngineSettings,
    reporter: StderrProgressReporter,
    cancel: &CancelToken,
) -> Result<ExitCode> {
    let manifests = runtime
        .manifests
        .iter()
        .map(|path| FileSystemReader::read_manifest(path))
        .collect::<Result<Vec<_>>>()?;

    let fast_path = load_fast_path(settings)?;
    let use_sandbox = runtime.sandbox || settings.sandbox_enabled;
    let pipeline = EngineFactory::runtime_pipeline(
        settings,
        EngineFactory::registry_client(settings)?,
        EngineFactory::sandbox_runner(settings, use_sandbox),
        fast_path.clone(),
        use_sandbox,
    );
    let context = EngineFactory::analysis_context(
        settings,
        KnowledgeBase::default(),
        load_aliases(settings)?,
        fast_path,
    );

    let partial = VerifyRuntimeUseCase::new(context, pipeline, reporter)
        .execute(manifests, use_sandbox, cancel)
        .await?;

    let presenter = PresenterFactory::create(PresenterType::from_output(runtime.output.clone()));
    present_json(presenter.as_ref(), &partial)?;
    Ok(ExitCode::Success)
}

fn run_merge(
    merge: &MergeArgs,
    settings: &EngineSettings,
    reporter: StderrProgressReporter,
) -> Result<AnalysisReport> {
    let partials = merge
        .partials
        .iter()
        .map(|path| FileSystemReader::read_partial_results(path))
        .collect::<Result<Vec<_>>>()?;

    MergeResultsUseCase::new(reporter).execute(partials, settings.target)
}

/// Writes the report, prints the summary and maps the outcome to an exit code
fn finish_report(report: &AnalysisReport, output: Option<PathBuf>, quiet: bool) -> Result<ExitCode> {
    let presenter = PresenterFactory::create(PresenterType::from_output(output));
    present_json(presenter.as_ref(), report)?;

    if !quiet {
        eprint!("{}", render_summary(report, std::io::stderr().is_terminal()));
    }

    if report.has_incompatible() {
        Ok(ExitCode::IncompatibleDetected)
    } else {
        Ok(ExitCode::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sources_or_default_prefers_configured() {
        let configured = vec![PathBuf::from("custom.json")];
        assert_eq!(
            sources_or_default(&configured, "/nonexistent/knowledge_bases"),
            configured
        );
        assert!(sources_or_default(&[], "/nonexistent/knowledge_bases").is_empty());

        let dir = TempDir::new().unwrap();
        let default_dir = dir.path().to_string_lossy().to_string();
        assert_eq!(
            sources_or_default(&[], &default_dir),
            vec![PathBuf::from(&default_dir)]
        );
    }

    #[test]
    fn test_load_fast_path_defaults_to_builtin() {
        let table = load_fast_path(&EngineSettings::default()).unwrap();
        assert!(!table.is_empty());
    }
}
