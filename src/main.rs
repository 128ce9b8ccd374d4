use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use scanzone::observability::{init_tracing, resolve_log_format};
use scanzone::{AppError, AppResult, FileKind, Notice, Session, SessionConfig};
use serde::Serialize;
use sz_app::{Action, Precondition};
use sz_extract::ExtractionEngine;
use sz_geometry::NormalizedZone;
use sz_ocr::OcrRecognizer;
use sz_pdf::LopdfParser;
use sz_settings::ConfigManager;
use tokio::runtime::Runtime;

#[derive(Debug, Parser)]
#[command(name = "scanzone", version, about = "Extract text from PDFs, whole images, or image zones")]
struct Cli {
    /// Settings file (default: ~/.scanzone/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Text buffer file; extracted text is appended to it
    #[arg(long, global = true)]
    buffer: Option<PathBuf>,

    /// Print a JSON report instead of the buffer
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the text layer of a PDF
    Pdf { file: PathBuf },
    /// Recognize text in an image, whole or per zone (percent of the image)
    Image {
        file: PathBuf,
        #[arg(long = "zone", value_name = "X,Y,W,H")]
        zones: Vec<NormalizedZone>,
    },
    /// Detect the file type, then extract
    Extract {
        file: PathBuf,
        #[arg(long = "zone", value_name = "X,Y,W,H")]
        zones: Vec<NormalizedZone>,
    },
    /// Check whether the buffer is long enough to be analyzed
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Appended,
    NoText,
    Rejected,
    Failed,
    Unchanged,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    buffer: &'a str,
    ready_for_analysis: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "scanzone failed");
            eprintln!("{e}");
            if e.is_user_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> AppResult<ExitCode> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new(),
    };
    init_tracing(resolve_log_format(manager.log_format()))?;
    tracing::debug!(path = ?manager.path(), "settings loaded");

    let config = SessionConfig::from_settings(&manager.get())?;
    let engine = ExtractionEngine::new(
        Arc::new(LopdfParser::new()),
        Arc::new(OcrRecognizer::new(manager.models_dir())),
        config.languages.clone(),
    );
    let mut session = Session::new(engine, config);

    if let Some(path) = &cli.buffer
        && path.exists()
    {
        session.set_buffer(fs::read_to_string(path)?);
    }

    if matches!(cli.command, Commands::Check) {
        session.submission()?;
        print_result(&cli, &session, Outcome::Unchanged, None)?;
        return Ok(ExitCode::SUCCESS);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let notices = match &cli.command {
        Commands::Pdf { file } => run_file(&runtime, &mut session, file, Some(FileKind::Pdf), &[])?,
        Commands::Image { file, zones } => {
            run_file(&runtime, &mut session, file, Some(FileKind::Image), zones)?
        }
        Commands::Extract { file, zones } => run_file(&runtime, &mut session, file, None, zones)?,
        Commands::Check => Vec::new(),
    };

    let (outcome, message) = summarize(&notices);
    if outcome == Outcome::Appended
        && let Some(path) = &cli.buffer
    {
        fs::write(path, session.buffer())?;
    }
    if let Some(message) = &message {
        eprintln!("{message}");
    }
    print_result(&cli, &session, outcome, message)?;

    Ok(match outcome {
        Outcome::Appended | Outcome::NoText | Outcome::Unchanged => ExitCode::SUCCESS,
        Outcome::Rejected => ExitCode::from(2),
        Outcome::Failed => ExitCode::FAILURE,
    })
}

fn run_file(
    runtime: &Runtime,
    session: &mut Session,
    file: &Path,
    kind: Option<FileKind>,
    zones: &[NormalizedZone],
) -> AppResult<Vec<Notice>> {
    let bytes = fs::read(file)?;
    let kind = kind
        .or_else(|| FileKind::sniff(&bytes, Some(file)))
        .ok_or_else(|| AppError::UnsupportedInput(file.to_path_buf()))?;

    let mut notices = Vec::new();
    let action = match kind {
        FileKind::Pdf => {
            if !zones.is_empty() {
                tracing::warn!(zones = zones.len(), "zones are ignored for PDF documents");
            }
            notices.extend(session.load_document(bytes));
            Action::ExtractDocument
        }
        FileKind::Image => {
            notices.extend(session.load_image(&bytes)?);
            for zone in zones {
                notices.extend(session.add_zone(zone));
            }
            if zones.is_empty() {
                Action::ExtractWholeImage
            } else {
                Action::ExtractZones
            }
        }
    };

    tracing::info!(file = %file.display(), ?kind, ?action, "starting extraction");
    let job_notices = runtime.block_on(session.dispatch(action));
    for notice in &job_notices {
        if let Notice::Progress(p) = notice {
            tracing::info!(progress = p.progress, status = %p.status, "progress");
        }
    }
    notices.extend(job_notices);
    Ok(notices)
}

/// Terminal outcome of a job from its notices.
fn summarize(notices: &[Notice]) -> (Outcome, Option<String>) {
    for notice in notices.iter().rev() {
        match notice {
            Notice::BufferChanged { .. } => return (Outcome::Appended, None),
            Notice::NoText => return (Outcome::NoText, Some("No text found.".to_string())),
            Notice::Precondition(p) => return (Outcome::Rejected, Some(describe(*p).to_string())),
            Notice::Rejected { message } => return (Outcome::Rejected, Some(message.clone())),
            Notice::Error { message } => return (Outcome::Failed, Some(message.clone())),
            _ => {}
        }
    }
    (Outcome::Unchanged, None)
}

fn describe(precondition: Precondition) -> &'static str {
    match precondition {
        Precondition::NoImage => "Load an image first.",
        Precondition::NoZones => "Draw at least one zone first.",
    }
}

fn print_result(
    cli: &Cli,
    session: &Session,
    outcome: Outcome,
    message: Option<String>,
) -> AppResult<()> {
    if cli.json {
        let report = Report {
            outcome,
            message,
            buffer: session.buffer(),
            ready_for_analysis: session.submission().is_ok(),
        };
        let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
        println!("{json}");
    } else if !session.buffer().is_empty() {
        println!("{}", session.buffer());
    }
    Ok(())
}
