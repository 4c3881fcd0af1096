//! Sumi-Glean main entry point
//!
//! This is the command-line interface for the Sumi-Glean page content gleaner.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_glean::config::{load_config_with_hash, Config};
use sumi_glean::harvest::glean;
use sumi_glean::output::print_report;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Glean: A polite page content gleaner
///
/// Sumi-Glean checks every target against its site's robots.txt, fetches the
/// permitted pages, extracts the text of the selected elements, and writes
/// the results to CSV (and optionally SQLite).
#[derive(Parser, Debug)]
#[command(name = "sumi-glean")]
#[command(version = "1.0.0")]
#[command(about = "A polite page content gleaner", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the targets without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Also append results to the SQLite database
    #[arg(long)]
    store: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        let store = cli.store || config.output.store_in_database;
        handle_glean(&config, store).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_glean=info,warn"),
            1 => EnvFilter::new("sumi_glean=debug,info"),
            2 => EnvFilter::new("sumi_glean=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let targets = config.build_targets()?;

    println!("=== Sumi-Glean Dry Run ===\n");

    println!("Fetching:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  Concurrency: {}", config.fetch.concurrency);
    println!(
        "  Attempts per page: {} ({}ms apart)",
        config.fetch.max_attempts, config.fetch.retry_delay_ms
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    if config.output.store_in_database {
        println!("  Database: {}", config.output.database_path);
    } else {
        println!("  Database: {} (only with --store)", config.output.database_path);
    }

    println!("\nTargets ({}):", targets.len());
    for target in &targets {
        println!("  - {} [{}]", target.address(), target.selector());
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles a normal run: process targets, print the report, write sinks
async fn handle_glean(config: &Config, store: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling run");
            on_interrupt.cancel();
        }
    });

    let (batch, reports) = glean(config, store, cancel).await?;

    print_report(&batch);

    let failed: Vec<_> = reports.iter().filter(|r| !r.is_ok()).collect();
    if failed.is_empty() {
        tracing::info!("Run completed successfully");
    } else {
        for report in &failed {
            if let Err(e) = &report.outcome {
                eprintln!("✗ Failed to write {} output: {}", report.sink, e);
            }
        }
    }

    Ok(())
}
