//! CLI entrypoint for Clinical Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    AuditLogger, ConsultationPipeline, FeedbackDispatcher, FeedbackSink, NoAuditLogger,
    NoFeedbackSink, RetrievalEngine, Submission,
};
use council_domain::{
    ConsultationInput, ConsultationReport, FeedbackPolarity, OutputFormat, Severity, Vitals,
};
use council_infrastructure::{
    ConfigLoader, FileConfig, HttpFeedbackSink, JsonlAuditLogger, KeywordSymptomClassifier,
    KnowledgeBaseRetriever, OpenAiCompatibleConfig, OpenAiCompatibleGateway,
};
use council_presentation::{
    Cli, ConsoleFormatter, EventObserver, OutputConfig, ProgressReporter, SimpleProgress,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Exit status for an emergency verdict
const EXIT_EMERGENCY: u8 = 2;

/// How long to wait for an in-flight feedback call before exiting
const FEEDBACK_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration from files
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    let log_file = cli.log_file.as_ref().or(file_config.logging.log_file.as_ref());
    let _log_guard = init_logging(cli.verbose, log_file)?;

    info!("Starting Clinical Council");

    // Validate configuration; warnings are reported, errors stop here
    for issue in file_config.validate() {
        match issue.severity {
            Severity::Warning => {
                warn!("{}", issue.message);
                eprintln!("Warning: {}", issue.message);
            }
            Severity::Error => eprintln!("Error: {}", issue.message),
        }
    }
    let council_config = file_config
        .to_council_config()
        .context("Invalid configuration")?;

    let output = OutputConfig::resolve(
        cli.output.map(Into::into),
        file_config.output.format,
        file_config.output.color,
        cli.quiet,
    );
    if !output.color {
        colored::control::set_override(false);
    }

    // Build input
    let mut vitals = Vitals::default();
    if let Some(hr) = cli.heart_rate {
        vitals = vitals.with_heart_rate(hr);
    }
    if let Some(spo2) = cli.spo2 {
        vitals = vitals.with_spo2(spo2);
    }
    if let Some(sbp) = cli.systolic_bp {
        vitals = vitals.with_systolic_bp(sbp);
    }
    let mut input = ConsultationInput::new(cli.symptoms.clone(), vitals)?;
    if let Some(age) = cli.age {
        input = input.with_age(age)?;
    }
    if let Some(sex) = cli.sex {
        input = input.with_sex(sex);
    }

    // === Dependency Injection ===
    let gateway = Arc::new(build_gateway(&file_config)?);
    let retriever = build_retriever(&file_config)?;
    let audit = build_audit_logger(&file_config);

    let cancellation = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation.clone());

    let pipeline = ConsultationPipeline::new(
        gateway,
        Arc::new(KeywordSymptomClassifier::new()),
        retriever,
        Arc::new(council_config),
    )
    .with_audit_logger(Arc::clone(&audit))
    .with_cancellation(cancellation);

    let mut stream = match pipeline.submit(input)? {
        Submission::Emergency(verdict) => {
            let rendered = match output.format {
                OutputFormat::Json => ConsoleFormatter::format_verdict_json(&verdict),
                _ => ConsoleFormatter::format_verdict(&verdict),
            };
            println!("{}", rendered);
            return Ok(ExitCode::from(EXIT_EMERGENCY));
        }
        Submission::Streaming(stream) => stream,
    };

    // Consume events in order
    let observer: Box<dyn EventObserver> = if output.show_progress {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let mut report = ConsultationReport::default();
    while let Some(event) = stream.recv().await {
        observer.on_event(&event);
        if output.format == OutputFormat::Events {
            observer.println(&ConsoleFormatter::format_event(&event));
        }
        report.apply(&event);
    }
    observer.finish();

    if !report.completed {
        bail!("Consultation was cancelled before it completed");
    }

    match output.format {
        OutputFormat::Events => println!("{}", ConsoleFormatter::format_footer()),
        OutputFormat::Summary => println!("{}", ConsoleFormatter::format_summary(&report)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&report)),
    }

    if let Some(polarity) = cli.feedback
        && let Some(synthesis) = &report.synthesis
    {
        send_feedback(&file_config, audit, &synthesis.summary, polarity).await;
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize logging based on verbosity level (or `RUST_LOG`), optionally to a file
fn init_logging(verbose: u8, log_file: Option<&impl AsRef<Path>>) -> Result<Option<WorkerGuard>> {
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    } else {
        match verbose {
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"), // -vvv or more
        }
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .context("--log-file must name a file")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(Some(guard))
}

fn build_gateway(config: &FileConfig) -> Result<OpenAiCompatibleGateway> {
    let provider = &config.provider;
    let mut gateway_config = OpenAiCompatibleConfig::new(provider.base_url.clone())
        .with_request_timeout(provider.request_timeout());

    match provider.resolve_api_key() {
        Some(key) => gateway_config = gateway_config.with_api_key(key),
        None => warn!(
            "No API key found in ${}; engine calls will likely fail and fall back",
            provider.api_key_env
        ),
    }

    Ok(OpenAiCompatibleGateway::new(gateway_config)?)
}

fn build_retriever(config: &FileConfig) -> Result<Arc<dyn RetrievalEngine>> {
    let retriever = match &config.retrieval.knowledge_base {
        Some(path) => KnowledgeBaseRetriever::from_path(path)?,
        None => KnowledgeBaseRetriever::builtin(),
    };
    info!("Knowledge base ready ({} entries)", retriever.len());
    Ok(Arc::new(retriever))
}

fn build_audit_logger(config: &FileConfig) -> Arc<dyn AuditLogger> {
    config
        .logging
        .audit_log
        .as_ref()
        .and_then(JsonlAuditLogger::new)
        .map(|logger| Arc::new(logger) as Arc<dyn AuditLogger>)
        .unwrap_or_else(|| Arc::new(NoAuditLogger))
}

fn spawn_ctrl_c_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling consultation");
            cancellation.cancel();
        }
    });
}

async fn send_feedback(
    config: &FileConfig,
    audit: Arc<dyn AuditLogger>,
    summary: &str,
    polarity: FeedbackPolarity,
) {
    let sink: Arc<dyn FeedbackSink> = match config.feedback.endpoint().map(HttpFeedbackSink::new) {
        Some(Ok(sink)) => Arc::new(sink),
        Some(Err(e)) => {
            warn!("Feedback sink unavailable: {}", e);
            Arc::new(NoFeedbackSink)
        }
        None => Arc::new(NoFeedbackSink),
    };

    let handle = FeedbackDispatcher::new(sink)
        .with_audit_logger(audit)
        .dispatch(summary, polarity);

    if tokio::time::timeout(FEEDBACK_GRACE, handle).await.is_err() {
        warn!("Feedback still in flight after {:?}; exiting anyway", FEEDBACK_GRACE);
    }
}
