//! # sheetsync-cli
//!
//! Command-line interface for sheetsync.

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use sheetsync_core::{
    fetch_column_order, load_and_summarize, provision, run, BulkLoadOutcome, CsvReplaySource,
    SamplingOptions, SamplingReport, SimulatedSensor, Source, SourceConfig, SyncConfig,
};
use sheetsync_remote::{GoogleSheetsStore, ShareRequest, SheetStore, WorkbookInfo};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// sheetsync - keep a spreadsheet workbook in step with sensor readings
#[derive(Parser)]
#[command(name = "sheetsync")]
#[command(author, version, about = "Provision, append to and bulk-load spreadsheet tabs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Workbook name (overrides the configuration)
    #[arg(short, long, global = true)]
    workbook: Option<String>,

    /// Output format for listings and summaries
    #[arg(short = 'f', long = "format", default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create the workbook, share it and seed its tabs
    Provision {
        /// Account granted write access
        #[arg(long, value_name = "EMAIL")]
        share_with: Option<String>,

        /// Tabs to create
        #[arg(long, value_delimiter = ',')]
        tabs: Option<Vec<String>>,
    },
    /// Sample readings and append one row per sample
    Append {
        /// Destination tab
        #[arg(short, long)]
        tab: Option<String>,

        /// Number of samples
        #[arg(short = 'n', long, conflicts_with = "forever")]
        count: Option<u64>,

        /// Sample until interrupted
        #[arg(long)]
        forever: bool,

        /// Seconds between samples
        #[arg(short, long)]
        interval: Option<u64>,

        /// Replay readings from a CSV file instead of the simulated sensor
        #[arg(long, value_name = "CSV")]
        replay: Option<PathBuf>,
    },
    /// Overwrite a tab with a CSV file and print its summary
    BulkLoad {
        /// CSV file to load
        #[arg(value_name = "CSV")]
        csv: Option<PathBuf>,

        /// Destination tab
        #[arg(short, long)]
        tab: Option<String>,

        /// Columns to summarise
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
    },
    /// List workbooks visible to the account
    Workbooks,
    /// List the tabs of the workbook
    Tabs,
    /// Delete the workbook and all of its tabs
    DeleteWorkbook,
    /// Delete one tab of the workbook
    DeleteTab {
        /// Tab to delete
        #[arg(short, long)]
        tab: String,
    },
}

/// Output format for results.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text output (default)
    #[default]
    Table,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    println!(
        "{} {}",
        "Start of sheetsync Process:".cyan().bold(),
        Local::now().format("%H:%M:%S")
    );
    let result = execute(&cli, &config).await;
    println!(
        "{} {}",
        "End of sheetsync Process:".cyan().bold(),
        Local::now().format("%H:%M:%S")
    );
    result
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Read the configuration file, then apply the environment and flags.
fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let config = match &cli.config {
        Some(path) => SyncConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SyncConfig::default(),
    };
    let config = apply_overrides(config.with_env(), cli);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn apply_overrides(mut config: SyncConfig, cli: &Cli) -> SyncConfig {
    if let Some(workbook) = &cli.workbook {
        config.workbook.clone_from(workbook);
    }
    match &cli.command {
        Command::Provision { share_with, tabs } => {
            if share_with.is_some() {
                config.share_with.clone_from(share_with);
            }
            if let Some(tabs) = tabs {
                config.tabs.clone_from(tabs);
            }
        }
        Command::Append {
            tab,
            count,
            forever,
            interval,
            replay,
        } => {
            if let Some(tab) = tab {
                config.append_tab.clone_from(tab);
            }
            if *forever {
                config.sample_count = None;
            } else if count.is_some() {
                config.sample_count = *count;
            }
            if let Some(interval) = interval {
                config.interval_secs = *interval;
            }
            if let Some(path) = replay {
                config.source = SourceConfig::Csv { path: path.clone() };
            }
        }
        Command::BulkLoad { csv, tab, columns } => {
            if csv.is_some() {
                config.csv_path.clone_from(csv);
            }
            if let Some(tab) = tab {
                config.bulk_tab.clone_from(tab);
            }
            if columns.is_some() {
                config.stats_columns.clone_from(columns);
            }
        }
        Command::Workbooks
        | Command::Tabs
        | Command::DeleteWorkbook
        | Command::DeleteTab { .. } => {}
    }
    config
}

async fn execute(cli: &Cli, config: &SyncConfig) -> Result<()> {
    let store = GoogleSheetsStore::new(&config.remote).with_context(|| {
        format!(
            "Failed to connect to the spreadsheet store (set {} or remote.access_token)",
            sheetsync_core::config::ACCESS_TOKEN_ENV
        )
    })?;

    match &cli.command {
        Command::Provision { .. } => run_provision(&store, config).await,
        Command::Append { .. } => run_append(&store, config).await,
        Command::BulkLoad { .. } => run_bulk_load(&store, config, cli.format).await,
        Command::Workbooks => {
            let workbooks = store
                .list_workbooks()
                .await
                .context("Failed to list workbooks")?;
            print_workbooks(&workbooks, cli.format)
        }
        Command::Tabs => {
            let workbook = store
                .fetch_workbook(&config.workbook)
                .await
                .with_context(|| format!("Failed to open workbook '{}'", config.workbook))?;
            let tabs = store.tab_names(&workbook).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tabs)?),
                OutputFormat::Table => {
                    for tab in tabs {
                        println!("{tab}");
                    }
                }
            }
            Ok(())
        }
        Command::DeleteWorkbook => run_delete_workbook(&store, &config.workbook).await,
        Command::DeleteTab { tab } => run_delete_tab(&store, &config.workbook, tab).await,
    }
}

async fn run_delete_workbook(store: &dyn SheetStore, name: &str) -> Result<()> {
    let workbook = store
        .fetch_workbook(name)
        .await
        .with_context(|| format!("Failed to open workbook '{name}'"))?;
    store
        .delete_workbook(&workbook)
        .await
        .with_context(|| format!("Failed to delete workbook '{name}'"))?;
    println!("{} {name}", "Deleted".green().bold());
    Ok(())
}

async fn run_delete_tab(store: &dyn SheetStore, name: &str, tab: &str) -> Result<()> {
    let workbook = store
        .fetch_workbook(name)
        .await
        .with_context(|| format!("Failed to open workbook '{name}'"))?;
    store
        .delete_tab(&workbook, tab)
        .await
        .with_context(|| format!("Failed to delete tab '{tab}' of '{name}'"))?;
    println!("{} {tab} from {name}", "Deleted".green().bold());
    Ok(())
}

async fn run_provision(store: &dyn SheetStore, config: &SyncConfig) -> Result<()> {
    let share = config.share_with.as_ref().map(|email| {
        let share = ShareRequest::writer(email);
        match &config.share_message {
            Some(message) => share.with_message(message),
            None => share,
        }
    });

    let workbook = provision(store, &config.workbook, share.as_ref(), &config.tabs, &config.columns)
        .await
        .with_context(|| format!("Failed to provision workbook '{}'", config.workbook))?;

    println!(
        "{} {} ({})",
        "Provisioned".green().bold(),
        workbook.name,
        workbook.url.as_deref().unwrap_or(&workbook.id)
    );
    println!("Tabs: {}", config.tabs.join(", "));
    Ok(())
}

async fn run_append(store: &dyn SheetStore, config: &SyncConfig) -> Result<()> {
    let tab = config.append_tab.as_str();
    let workbook = store
        .fetch_workbook(&config.workbook)
        .await
        .with_context(|| format!("Failed to open workbook '{}'", config.workbook))?;
    let order = fetch_column_order(store, &workbook, tab)
        .await
        .with_context(|| format!("Failed to read the header of tab '{tab}'"))?;
    if order.is_empty() {
        bail!("Tab '{tab}' has no header row; provision the workbook first");
    }

    let mut source = build_source(&config.source, config.timestamp_column())?;
    let options = SamplingOptions::new(config.sample_count, config.interval());

    let report = run(
        source.as_mut(),
        store,
        &workbook,
        tab,
        &order,
        options,
        shutdown_signal(),
    )
    .await
    .with_context(|| format!("Sampling into tab '{tab}' failed"))?;

    print_report(&report, tab);
    Ok(())
}

/// Source with a fixed field set; the tab header only decides column order.
fn build_source(source: &SourceConfig, timestamp_column: &str) -> Result<Box<dyn Source>> {
    Ok(match source {
        SourceConfig::Simulated => Box::new(SimulatedSensor::new(timestamp_column)),
        SourceConfig::Csv { path } => Box::new(
            CsvReplaySource::from_path(path, timestamp_column)
                .with_context(|| format!("Failed to read replay file: {}", path.display()))?,
        ),
    })
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

async fn run_bulk_load(store: &dyn SheetStore, config: &SyncConfig, format: OutputFormat) -> Result<()> {
    let Some(csv_path) = &config.csv_path else {
        bail!("No CSV file given; pass one or set csv_path in the configuration");
    };
    let workbook = store
        .fetch_workbook(&config.workbook)
        .await
        .with_context(|| format!("Failed to open workbook '{}'", config.workbook))?;

    let outcome = load_and_summarize(
        store,
        &workbook,
        &config.bulk_tab,
        csv_path,
        config.stats_columns.as_deref(),
    )
    .await
    .with_context(|| format!("Failed to load {} into tab '{}'", csv_path.display(), config.bulk_tab))?;

    print_outcome(&outcome, &config.bulk_tab, format)
}

fn print_report(report: &SamplingReport, tab: &str) {
    let status = if report.cancelled {
        "Interrupted".yellow().bold()
    } else {
        "Done".green().bold()
    };
    println!("{status} {} rows appended to {tab}", report.samples);
}

fn print_outcome(outcome: &BulkLoadOutcome, tab: &str, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    let verb = if outcome.replaced_existing { "Replaced" } else { "Created" };
    println!(
        "{} {tab} with {} rows",
        verb.green().bold(),
        outcome.rows_loaded
    );
    println!("{} {}", "Header:".cyan().bold(), outcome.header.join(", "));

    if outcome.summary.columns.is_empty() {
        println!("{}", "No numeric columns to summarise".yellow());
        return Ok(());
    }
    println!();
    println!("{}", "Summary".cyan().bold());
    for column in &outcome.summary.columns {
        println!("{column}");
    }
    println!();
    println!("{}", "Correlation".cyan().bold());
    println!("{}", outcome.summary.correlation);
    Ok(())
}

fn print_workbooks(workbooks: &[WorkbookInfo], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(workbooks)?),
        OutputFormat::Table => {
            if workbooks.is_empty() {
                println!("(no workbooks)");
            }
            for wb in workbooks {
                println!(
                    "{}  {}  {}",
                    wb.name.bold(),
                    wb.id,
                    wb.modified.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}
