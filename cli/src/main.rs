//! CLI entrypoint for policy-agents
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use policy_application::{
    AgentFactory, BuildCatalogInput, BuildCatalogOutput, BuildCatalogUseCase, DocumentParser,
    EvaluatorProvider, ExtractDataUseCase, NoProgress, NoRuleGraph, NoRunLogger, Orchestrator,
    PipelineConfig, PipelineProgress, ReasoningService, RequirementExtractor, RuleGraph,
    RunComplianceInput, RunComplianceUseCase, RunLogger,
};
use policy_domain::{AgentCatalog, Chunker, PolicyDomain};
use policy_infrastructure::{
    ConfigLoader, FileConfig, FileRuleGraph, JsonlRunLogger, OpenAiReasoningService,
    TextDocumentParser, load_catalog, load_extracted_data, write_json,
};
use policy_presentation::{
    CatalogArgs, CheckArgs, Cli, Command, ConsoleFormatter, OutputConfig, ProgressReporter,
    SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Shared collaborators for one invocation
struct App {
    config: FileConfig,
    pipeline: PipelineConfig,
    output: OutputConfig,
    reasoning: Arc<dyn ReasoningService>,
    run_logger: Arc<dyn RunLogger>,
    progress: Box<dyn PipelineProgress>,
    cancel: CancellationToken,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let Some(command) = cli.command else {
        bail!("No command given. Run `policy-agents --help` for usage.");
    };

    info!("Starting policy-agents");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    for issue in config.check()? {
        warn!("{}", issue);
    }
    let pipeline = config.to_pipeline_config();

    let output = OutputConfig::from_file(
        config.output.format,
        config.output.color,
        config.output.show_progress,
    )
    .with_cli(cli.format, cli.quiet);
    output.apply();

    // === Dependency Injection ===
    let reasoning: Arc<dyn ReasoningService> =
        Arc::new(OpenAiReasoningService::from_config(&config.reasoning)?);

    let run_logger: Arc<dyn RunLogger> = match &cli.run_log {
        Some(path) => Arc::new(
            JsonlRunLogger::new(path)
                .ok_or_else(|| anyhow!("Could not open run log {}", path.display()))?,
        ),
        None => Arc::new(NoRunLogger),
    };

    let progress: Box<dyn PipelineProgress> = if !output.show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    let app = App {
        config,
        pipeline,
        output,
        reasoning,
        run_logger,
        progress,
        cancel,
    };

    match command {
        Command::Catalog(args) => run_catalog(&app, args).await,
        Command::Check(args) => run_check(&app, args).await,
    }
}

/// Console logging by verbosity, plus an optional daily-rolling file.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "policy-agents.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            cancel.cancel();
        }
    });
}

fn parse_domain_hint(
    cli_hint: Option<&str>,
    pipeline: &PipelineConfig,
) -> Result<Option<PolicyDomain>> {
    match cli_hint {
        Some(raw) => Ok(Some(raw.parse::<PolicyDomain>().map_err(|e| anyhow!(e))?)),
        None => Ok(pipeline.domain_hint),
    }
}

async fn build_catalog(
    app: &App,
    policy: &Path,
    hint: Option<PolicyDomain>,
) -> Result<BuildCatalogOutput> {
    let document = TextDocumentParser::new().parse(policy)?;

    let extractor = RequirementExtractor::from_config(Arc::clone(&app.reasoning), &app.pipeline)
        .with_run_logger(Arc::clone(&app.run_logger));
    let use_case = BuildCatalogUseCase::new(extractor, Chunker::new(app.pipeline.max_tokens))
        .with_run_logger(Arc::clone(&app.run_logger));
    let input = BuildCatalogInput::new(document).with_domain_hint(hint);

    let output = tokio::select! {
        _ = app.cancel.cancelled() => bail!("Cancelled"),
        output = use_case.execute_with_progress(input, &*app.progress) => output?,
    };

    info!(
        "Catalog: {} agents, {} extraction failures, {} rejected",
        output.catalog.len(),
        output.extraction_failures.len(),
        output.rejected.len()
    );
    Ok(output)
}

async fn run_catalog(app: &App, args: CatalogArgs) -> Result<()> {
    let hint = parse_domain_hint(args.domain_hint.as_deref(), &app.pipeline)?;
    let output = build_catalog(app, &args.policy, hint).await?;

    if let Some(path) = &args.output {
        write_json(path, &output)?;
        info!("Wrote catalog to {}", path.display());
    }
    println!("{}", ConsoleFormatter::format_catalog(&output, app.output.format));

    if output.catalog.is_empty() {
        bail!("No agents could be built from {}", args.policy.display());
    }
    Ok(())
}

fn rule_graph(config: &FileConfig) -> Result<Arc<dyn RuleGraph>> {
    Ok(match &config.rule_graph.path {
        Some(path) => Arc::new(FileRuleGraph::load(path)?),
        None => Arc::new(NoRuleGraph),
    })
}

async fn run_check(app: &App, args: CheckArgs) -> Result<()> {
    // === Catalog ===
    let catalog: AgentCatalog = match (&args.catalog, &args.policy) {
        (Some(path), _) => load_catalog(path)?,
        (None, Some(policy)) => {
            let hint = parse_domain_hint(args.domain_hint.as_deref(), &app.pipeline)?;
            build_catalog(app, policy, hint).await?.catalog
        }
        (None, None) => bail!("Either --catalog or --policy is required"),
    };

    let selected: Vec<String> = if args.all {
        catalog.iter().map(|s| s.agent_id.clone()).collect()
    } else {
        args.agents.clone()
    };

    // === Assessment data ===
    let (data, document_id) = match (&args.data, &args.document) {
        (Some(path), _) => (load_extracted_data(path)?, path.display().to_string()),
        (None, Some(path)) => {
            let specs = catalog
                .select(&selected)
                .map_err(|unknown| anyhow!("Unknown agent ids: {}", unknown.join(", ")))?;
            let document = TextDocumentParser::new().parse(path)?;
            let extract =
                ExtractDataUseCase::new(Arc::clone(&app.reasoning), app.pipeline.retry.clone());
            let data = tokio::select! {
                _ = app.cancel.cancelled() => bail!("Cancelled"),
                data = extract.execute(&document, &specs) => data?,
            };
            (data, path.display().to_string())
        }
        (None, None) => bail!("Either --data or --document is required"),
    };

    // === Evaluation ===
    let factory: Arc<dyn EvaluatorProvider> = Arc::new(AgentFactory::from_config(
        Arc::clone(&app.reasoning),
        rule_graph(&app.config)?,
        &app.pipeline,
    ));
    let orchestrator = Orchestrator::from_config(factory, &app.pipeline)
        .with_run_logger(Arc::clone(&app.run_logger));
    let use_case = RunComplianceUseCase::new(orchestrator)
        .with_max_recommendations(app.pipeline.max_recommendations)
        .with_run_logger(Arc::clone(&app.run_logger));

    let input = RunComplianceInput::new(document_id, selected, data);
    let report = use_case
        .execute_with_progress(&catalog, input, &app.cancel, &*app.progress)
        .await?;

    if let Some(path) = &args.output {
        write_json(path, &report)?;
        info!("Wrote report to {}", path.display());
    }
    println!("{}", ConsoleFormatter::format_report(&report, app.output.format));

    Ok(())
}
