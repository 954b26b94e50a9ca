//! GPU Price Tracker — Entry Point
//!
//! One binary, two write modes plus read-only views:
//! - `--init`: write the synthetic weekly backfill (refuses if data exists)
//! - default: scrape all providers, reconcile, append one weekly snapshot
//!   (refuses until `--init` has run)
//! - `export` / `summary`: read the series, never write it
//!
//! Wiring sequence:
//! 1. Parse CLI + load config.toml
//! 2. Init tracing (JSON or pretty, to stderr)
//! 3. Build catalog, JSON store and snapshot store
//! 4. Dispatch the selected mode

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use gpu_price_tracker::adapters::persistence::JsonSeriesStore;
use gpu_price_tracker::adapters::providers::{HttpFetcher, ProviderAdapter};
use gpu_price_tracker::config::{self, AppConfig, LogFormat};
use gpu_price_tracker::domain::{materialize, trend};
use gpu_price_tracker::ports::PriceSource;
use gpu_price_tracker::usecases::{Collector, SnapshotStore};

#[derive(Parser)]
#[command(name = "gpu-price-tracker")]
#[command(about = "Weekly on-demand cloud GPU price tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Create the synthetic weekly history instead of collecting
    #[arg(long)]
    init: bool,

    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Override the price series document path
    #[arg(long)]
    data_file: Option<String>,

    /// Override the number of backfilled weeks (with --init)
    #[arg(long)]
    weeks: Option<usize>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the series as JSON lines: one row per (week, GPU)
    Export,

    /// Print latest prices with their change over the lookback window
    Summary {
        /// Lookback in weeks
        #[arg(long, default_value_t = trend::DEFAULT_LOOKBACK)]
        lookback: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Load configuration ───────────────────────────────
    let mut config = config::loader::load_config(&cli.config)
        .context("Failed to load configuration")?;
    if let Some(path) = &cli.data_file {
        config.tracker.data_file.clone_from(path);
    }
    if let Some(level) = &cli.log_level {
        config.tracker.log_level.clone_from(level);
    }

    // ── 2. Initialize logging ───────────────────────────────
    init_tracing(&config);

    info!(
        name = %config.tracker.name,
        version = env!("CARGO_PKG_VERSION"),
        data_file = %config.tracker.data_file,
        gpus = config.gpus.len(),
        "Starting GPU price tracker"
    );

    // ── 3. Catalog + store ──────────────────────────────────
    let repository = Arc::new(JsonSeriesStore::new(&config.tracker.data_file));
    let store = SnapshotStore::new(repository, config.catalog());
    let today = chrono::Local::now().date_naive();

    // ── 4. Dispatch ─────────────────────────────────────────
    anyhow::ensure!(
        !(cli.init && cli.command.is_some()),
        "--init cannot be combined with a subcommand"
    );

    match cli.command {
        Some(Command::Export) => export(&store).await,
        Some(Command::Summary { lookback }) => summary(&store, lookback).await,
        None if cli.init => {
            let weeks = cli.weeks.unwrap_or(config.tracker.backfill_weeks);
            let mut rng = StdRng::seed_from_u64(config.tracker.backfill_seed);
            let series = store.initialize(weeks, today, &mut rng).await?;
            info!(
                entries = series.len(),
                gpus = series.tracked_gpus().len(),
                "Created {} weekly entries with {} GPUs",
                series.len(),
                series.tracked_gpus().len()
            );
            Ok(())
        }
        None => collect(&config, store, today).await,
    }
}

/// Scrape, reconcile and append one snapshot.
async fn collect(
    config: &AppConfig,
    store: SnapshotStore<JsonSeriesStore>,
    today: chrono::NaiveDate,
) -> Result<()> {
    let http = HttpFetcher::new(config.http.fetcher_config())?;
    let sources: Vec<Box<dyn PriceSource>> = ProviderAdapter::from_config(&config.providers, &http)
        .into_iter()
        .map(|adapter| Box::new(adapter) as Box<dyn PriceSource>)
        .collect();

    let collector = Collector::new(sources, store, config.http.timeout());
    let mut rng = StdRng::from_entropy();
    let report = collector.collect(today, &mut rng).await?;

    report.stats.log_summary("weekly collection");
    report.log_final_prices();
    Ok(())
}

/// Print materialized rows as JSON lines on stdout.
async fn export(store: &SnapshotStore<JsonSeriesStore>) -> Result<()> {
    let series = store.load().await?;
    if series.is_empty() {
        eprintln!("No GPU pricing data available. Run with --init first.");
        return Ok(());
    }

    for row in materialize(&series) {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}

/// Print latest prices and lookback change, cheapest first.
async fn summary(store: &SnapshotStore<JsonSeriesStore>, lookback: usize) -> Result<()> {
    let series = store.load().await?;
    let Some(latest) = series.latest() else {
        eprintln!("No GPU pricing data available. Run with --init first.");
        return Ok(());
    };

    println!(
        "{} GPUs tracked · {} weeks · last updated {}",
        series.tracked_gpus().len(),
        series.len(),
        latest.date
    );

    let mut trends = trend::summarize(&series, lookback);
    trends.sort_by(|a, b| a.latest.total_cmp(&b.latest));
    for t in trends {
        println!(
            "{:<14} ${:>6.2}/hr  {:>+6.1}% ({}wk)",
            t.gpu, t.latest, t.change_pct, lookback
        );
    }
    Ok(())
}

/// Install the global tracing subscriber; `RUST_LOG` wins over config.
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.tracker.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.tracker.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
