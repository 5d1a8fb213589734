use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use api_http::HttpApiClient;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use config::{AppConfig, ConfigStore};
use console::style;
use core_orchestrator::{ConfidenceBand, Orchestrator, RenderedAnswer, UploadReport};
use core_types::{AnswerMode, LocalFile, UiLanguage};
use i18n::I18n;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Command line client for the document question answering service.
#[derive(Parser, Debug)]
#[command(name = "dossier")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the ingestion service (overrides the stored config)
    #[arg(long)]
    base_url: Option<String>,

    /// Interface language
    #[arg(long, value_enum)]
    lang: Option<LangArg>,

    /// Directory holding config.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LangArg {
    TrTr,
    EnUs,
}

impl From<LangArg> for UiLanguage {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::TrTr => UiLanguage::TrTr,
            LangArg::EnUs => UiLanguage::EnUs,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List known documents and their indexing state
    Documents,

    /// Upload files for ingestion
    Upload {
        /// Files to submit (PDF, JPG or PNG)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Ask a question over selected documents
    Ask {
        /// The question to ask
        question: String,

        /// Document id to answer from (repeatable)
        #[arg(short = 'd', long = "document")]
        documents: Vec<String>,

        /// Number of retrieval chunks to consult
        #[arg(long)]
        top_k: Option<u16>,
    },

    /// Probe the ingestion service
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = load_config(cli.config_dir.clone());
    let language = cli.lang.map(UiLanguage::from).unwrap_or(config.language);
    let i18n = I18n::new(language);

    if let Err(error) = run(&cli, &config, &i18n).await {
        eprintln!("{}: {error:#}", style(i18n.t("error.prefix")).red().bold());
        std::process::exit(1);
    }
}

// Rendered output goes to stdout; logs stay on stderr.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(dir: Option<PathBuf>) -> AppConfig {
    let store = match dir {
        Some(dir) => ConfigStore::from_dir(dir),
        None => match ConfigStore::from_default_location() {
            Ok(store) => store,
            Err(err) => {
                error!("failed to resolve config location: {err}");
                return AppConfig::default();
            }
        },
    };
    match store.load_or_init() {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load config: {err}");
            AppConfig::default()
        }
    }
}

async fn run(cli: &Cli, config: &AppConfig, i18n: &I18n) -> Result<()> {
    let base_url = cli
        .base_url
        .clone()
        .unwrap_or_else(|| config.api.base_url.clone());

    let mut builder = reqwest::Client::builder();
    if let Some(ms) = config.api.request_timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    let client = builder.build().context("failed to build http client")?;
    let api = Arc::new(HttpApiClient::with_client(client, base_url));
    let orchestrator = Orchestrator::new(api).with_default_top_k(config.api.default_top_k);

    match &cli.command {
        Commands::Documents => run_documents(&orchestrator, i18n).await,
        Commands::Upload { paths } => run_upload(&orchestrator, i18n, paths).await,
        Commands::Ask {
            question,
            documents,
            top_k,
        } => run_ask(&orchestrator, i18n, question, documents, *top_k).await,
        Commands::Health => run_health(&orchestrator, i18n).await,
    }
}

async fn run_documents(orchestrator: &Orchestrator, i18n: &I18n) -> Result<()> {
    orchestrator.refresh_documents().await?;
    render_document_table(orchestrator, i18n);
    Ok(())
}

async fn run_upload(orchestrator: &Orchestrator, i18n: &I18n, paths: &[PathBuf]) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(LocalFile::from_path(path)?);
    }
    orchestrator.select_files(files)?;
    let report = orchestrator.submit_upload().await?;
    render_upload_report(&report, i18n);
    println!();
    render_document_table(orchestrator, i18n);
    Ok(())
}

async fn run_ask(
    orchestrator: &Orchestrator,
    i18n: &I18n,
    question: &str,
    ids: &[String],
    top_k: Option<u16>,
) -> Result<()> {
    orchestrator.refresh_documents().await?;
    for id in ids {
        if orchestrator.is_selected(id) {
            continue;
        }
        if !orchestrator.toggle_selection(id) {
            let status = orchestrator
                .document(id)
                .map(|doc| doc.status)
                .unwrap_or_else(|| "?".to_owned());
            eprintln!(
                "{} {} [{}]",
                style(short_id(id)).dim(),
                style(i18n.t("ask.skipped")).yellow(),
                status
            );
        }
    }
    let answer = orchestrator.ask(question, top_k).await?;
    render_answer(&answer, i18n);
    Ok(())
}

async fn run_health(orchestrator: &Orchestrator, i18n: &I18n) -> Result<()> {
    match orchestrator.health_snapshot().await {
        Some(report) => {
            println!("{}: {}", style(i18n.t("health.title")).bold(), report.status);
            let name_width = report
                .services
                .keys()
                .map(|name| name.chars().count())
                .max()
                .unwrap_or(0);
            for (service, state) in &report.services {
                println!("  {service:<name_width$}  {state}");
            }
        }
        None => println!("{}", style(i18n.t("health.unreachable")).red()),
    }
    Ok(())
}

fn render_document_table(orchestrator: &Orchestrator, i18n: &I18n) {
    let documents = orchestrator.documents();
    println!("{}", style(i18n.t("documents.title")).bold());
    if documents.is_empty() {
        println!("  {}", i18n.t("documents.empty"));
        return;
    }

    let name_width = documents
        .iter()
        .map(|doc| doc.filename.chars().count())
        .max()
        .unwrap_or(0);
    let status_width = documents
        .iter()
        .map(|doc| doc.status.chars().count())
        .max()
        .unwrap_or(0);
    for document in &documents {
        let marker = if document.is_indexed() { "*" } else { " " };
        let status = format!("{:<status_width$}", document.status);
        let status = if document.is_indexed() {
            style(status).green()
        } else {
            style(status).yellow()
        };
        println!(
            "{} {} {:<name_width$}  {:<4} {:<5} {} {}",
            marker,
            style(short_id(&document.id)).dim(),
            document.filename,
            document.file_type.to_uppercase(),
            document.language,
            status,
            document
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M"),
        );
    }
    println!("{}", style(i18n.t("documents.hint")).dim());
}

fn render_upload_report(report: &UploadReport, i18n: &I18n) {
    println!("{}", style(i18n.t("upload.accepted")).bold());
    if report.outcome.accepted.is_empty() {
        println!("  -");
    }
    for file in &report.outcome.accepted {
        println!("  {} ({})", file.filename, style(&file.status).green());
    }

    println!("{}", style(i18n.t("upload.rejected")).bold());
    if report.outcome.rejected.is_empty() {
        println!("  -");
    }
    for file in &report.outcome.rejected {
        println!("  {}: {}", file.filename, style(&file.reason).yellow());
    }

    if report.refresh_error.is_some() {
        eprintln!("{}", style(i18n.t("upload.refresh_failed")).yellow());
    }
}

fn render_answer(answer: &RenderedAnswer, i18n: &I18n) {
    let mode_label = match answer.mode {
        AnswerMode::GroundedAnswer => style(i18n.t("mode.grounded_answer")).green().bold(),
        AnswerMode::NoEvidence => style(i18n.t("mode.no_evidence")).yellow().bold(),
    };
    let band = match answer.confidence_band() {
        ConfidenceBand::High => style(i18n.t("confidence.high")).green(),
        ConfidenceBand::Low => style(i18n.t("confidence.low")).yellow(),
    };
    println!(
        "{}  {}: {:.0}% ({})  {}: {}",
        mode_label,
        i18n.t("ask.confidence"),
        answer.confidence * 100.0,
        band,
        i18n.t("ask.chunks"),
        answer.used_chunks
    );
    println!();
    println!("{}", style(i18n.t("ask.answer")).bold());
    println!("{}", answer.answer);

    if answer.is_grounded() && !answer.citations.is_empty() {
        println!();
        println!("{}", style(i18n.t("ask.citations")).bold());
        for citation in &answer.citations {
            let location = match citation.page {
                Some(page) => format!("{} ({} {})", citation.filename, i18n.t("ask.page"), page),
                None => citation.filename.clone(),
            };
            println!("  {} - {}", style(location).cyan(), citation.snippet);
        }
    }
}

// Listing ids are long hex strings; eight characters is enough to tell rows
// apart on screen.
fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
