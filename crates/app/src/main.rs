mod practice;
mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use quiz_core::Clock;
use services::quiz::JsonDirectorySource;
use services::{AppServices, ModuleCatalog, ProgressSnapshot, SessionError};
use storage::DEFAULT_NAMESPACE;

use crate::practice::{PracticeEnd, run_session};
use crate::report::{StatsReport, render_modules};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("refusing to wipe progress without --yes")]
    ResetNotConfirmed,
    #[error("storage rejected the write; progress was not changed")]
    WriteRejected,
}

#[derive(Debug, Parser)]
#[command(name = "quiz")]
#[command(about = "Grade-three Chinese review quizzes with local progress tracking")]
struct Cli {
    /// `SQLite` URL or file path for the progress store.
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    db: String,
    /// Directory holding `<dataKey>.json` question files.
    #[arg(long, global = true, env = "QUIZ_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// JSON module catalog replacing the built-in one.
    #[arg(long, global = true, env = "QUIZ_CATALOG")]
    catalog: Option<PathBuf>,
    #[arg(long, global = true, env = "QUIZ_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    namespace: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List modules by category with completion and progress.
    Modules,
    /// Lifetime totals, accuracy and overall progress.
    Stats,
    /// Practice one module interactively.
    Practice { module_id: String },
    /// Wipe all progress, statistics and mastered questions.
    Reset {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Write a progress snapshot as JSON.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Restore progress from a snapshot file.
    Import { file: PathBuf },
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || CliError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid().into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_services(cli: &Cli) -> Result<AppServices, Box<dyn std::error::Error>> {
    if cli.db.trim().is_empty() {
        return Err(CliError::InvalidDbUrl { raw: cli.db.clone() }.into());
    }
    let db_url = normalize_sqlite_url(cli.db.clone());
    prepare_sqlite_file(&db_url)?;

    let catalog = match &cli.catalog {
        Some(path) => ModuleCatalog::load(path).await?,
        None => ModuleCatalog::builtin(),
    };
    let source = Arc::new(JsonDirectorySource::new(&cli.data_dir));
    let services = AppServices::new_sqlite(
        &db_url,
        &cli.namespace,
        Clock::default_clock(),
        catalog,
        source,
    )
    .await?;
    Ok(services)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let services = build_services(&cli).await?;
    let ledger = services.ledger();
    let mut stdout = tokio::io::stdout();

    match cli.command {
        Commands::Modules => {
            let overview = services.practice().module_overview().await;
            let text = render_modules(services.catalog(), &overview);
            stdout.write_all(text.as_bytes()).await?;
        }
        Commands::Stats => {
            let totals = services.practice().module_totals().await;
            let report = StatsReport {
                stats: ledger.stats().await,
                today: ledger.clock().today(),
                mastered: ledger.total_correct_count().await,
                overall_percent: ledger.aggregate_progress_percent(&totals).await,
                completion_percent: ledger
                    .completion_rate_percent(services.catalog().len())
                    .await,
            };
            stdout.write_all(report.render().as_bytes()).await?;
        }
        Commands::Practice { module_id } => {
            let started = match services.practice().start_session(&module_id).await {
                Ok(started) => started,
                Err(SessionError::DataLoad(err)) => {
                    stdout
                        .write_all("题目数据加载失败，请检查数据目录后重试。\n".as_bytes())
                        .await?;
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            };
            let mut input = BufReader::new(tokio::io::stdin());
            if let PracticeEnd::Quit = run_session(started, &mut input, &mut stdout).await? {
                tracing::debug!(module = %module_id, "practice abandoned");
            }
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(CliError::ResetNotConfirmed.into());
            }
            if !ledger.reset_all().await {
                return Err(CliError::WriteRejected.into());
            }
            stdout.write_all("所有学习进度已清除。\n".as_bytes()).await?;
        }
        Commands::Export { out } => {
            let json = ledger.export_snapshot().await.to_json()?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    tracing::info!(path = %path.display(), "progress exported");
                }
                None => {
                    stdout.write_all(json.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                }
            }
        }
        Commands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let snapshot = ProgressSnapshot::from_json(&raw)?;
            if !ledger.import_snapshot(&snapshot).await {
                return Err(CliError::WriteRejected.into());
            }
            stdout.write_all("学习进度已导入。\n".as_bytes()).await?;
        }
    }

    stdout.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // Binary glue: report once, then exit non-zero.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
