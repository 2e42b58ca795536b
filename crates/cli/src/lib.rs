//! # `vendorsum-cli` Library Crate
//!
//! Argument parsing, logging setup and command dispatch for the `vendorsum`
//! binary. The pipeline itself lives in the `vendorsum` library.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use vendorsum::config::AppConfig;
use vendorsum::constants::{INGESTION_LOG_FILE, PIPELINE_LOG_FILE, SUMMARY_LOG_FILE};
use vendorsum::db::Store;
use vendorsum::{load_raw_data, run_summary, RatioPolicy};

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML config file. Defaults to `vendorsum.yml` if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Path to the SQLite database file.
    #[arg(long, global = true)]
    pub db: Option<String>,
    /// Directory where run logs are appended.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load every CSV file in a directory into its own table
    Ingest(IngestArgs),
    /// Build the vendor sales summary table from the ingested data
    Summarize(SummarizeArgs),
    /// Ingest, then summarize
    Run(RunArgs),
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Directory containing the raw CSV files.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SummarizeArgs {
    /// How ratios treat a zero divisor: `propagate` or `zero-guarded`.
    #[arg(long)]
    pub policy: Option<RatioPolicy>,
    /// Name of the summary table to write.
    #[arg(long)]
    pub table: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub ingest: IngestArgs,
    #[command(flatten)]
    pub summarize: SummarizeArgs,
}

impl Commands {
    /// The log file this command appends to.
    pub fn log_file_name(&self) -> &'static str {
        match self {
            Commands::Ingest(_) => INGESTION_LOG_FILE,
            Commands::Summarize(_) => SUMMARY_LOG_FILE,
            Commands::Run(_) => PIPELINE_LOG_FILE,
        }
    }
}

// --- Setup ---

/// Loads the configuration and applies command-line overrides on top of it.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
    }

    let (ingest, summarize) = match &cli.command {
        Commands::Ingest(args) => (Some(args), None),
        Commands::Summarize(args) => (None, Some(args)),
        Commands::Run(args) => (Some(&args.ingest), Some(&args.summarize)),
    };
    if let Some(data_dir) = ingest.and_then(|a| a.data_dir.as_ref()) {
        config.data_dir = data_dir.clone();
    }
    if let Some(args) = summarize {
        if let Some(policy) = args.policy {
            config.ratio_policy = policy;
        }
        if let Some(table) = &args.table {
            config.summary_table = table.clone();
        }
    }

    Ok(config)
}

/// Installs a global subscriber that appends plain-text logs to `log_dir/file_name`.
///
/// `RUST_LOG` can raise or lower the default `info` level.
pub fn init_logging(log_dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory '{}'", log_dir.display()))?;
    let log_path = log_dir.join(file_name);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    let subscriber = fmt::Subscriber::builder()
        .with_writer(Mutex::new(log_file))
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("vendorsum=info".parse()?)
                .add_directive("vendorsum_cli=info".parse()?),
        )
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(log_path)
}

// --- Public Entrypoint ---

/// Runs the parsed command against the resolved configuration.
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let store = Store::open(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database '{}'", config.db_path))?;

    match cli.command {
        Commands::Ingest(_) => handle_ingest(&store, &config).await,
        Commands::Summarize(_) => handle_summarize(&store, &config).await,
        Commands::Run(_) => {
            handle_ingest(&store, &config).await?;
            handle_summarize(&store, &config).await
        }
    }
}

// --- Command Handlers ---

async fn handle_ingest(store: &Store, config: &AppConfig) -> Result<()> {
    info!("Starting ingestion from '{}'", config.data_dir.display());
    let report = load_raw_data(store, &config.data_dir)
        .await
        .with_context(|| format!("Ingestion from '{}' failed", config.data_dir.display()))?;

    for table in &report.tables {
        println!("Ingested {} rows into '{}'", table.rows, table.table_name);
    }
    println!(
        "✅ Ingested {} tables in {:.2}s.",
        report.tables.len(),
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

async fn handle_summarize(store: &Store, config: &AppConfig) -> Result<()> {
    info!("Building vendor summary with ratio policy '{}'", config.ratio_policy);
    let report = run_summary(store, &config.summary_options())
        .await
        .context("Vendor summary failed")?;

    println!(
        "✅ Wrote {} rows into '{}' in {:.2}s.",
        report.rows,
        report.table_name,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}
