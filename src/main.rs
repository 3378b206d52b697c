//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest product harvester.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_harvest::config::{default_config_with_hash, load_config_with_hash, Config};
use sumi_harvest::crawler::harvest;
use sumi_harvest::output::{export_latest, load_statistics, print_statistics};
use sumi_harvest::storage::open_store;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a catalog product harvester
///
/// Sumi-Harvest walks the categories of a catalog shop, extracts every
/// product page into a record of attributes, and writes one delimited
/// table whose columns are the union of all attributes seen.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A catalog product harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume an unfinished run with the same configuration (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a new run, ignoring stored progress
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export_only"])]
    dry_run: bool,

    /// Show statistics for the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_only"])]
    stats: bool,

    /// Rewrite the table from the latest stored run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => {
            tracing::info!("Using built-in configuration");
            default_config_with_hash().context("Built-in configuration is invalid")?
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_only {
        handle_export_only(&config)?;
    } else {
        handle_harvest(config, &config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Manufacturer: {}", config.site.manufacturer);
    println!("  Currency suffix: {:?}", config.site.currency_suffix);

    println!("\nOutput:");
    println!("  Store: {}", config.output.store_path);
    println!("  Table: {}", config.output.csv_path);
    println!("  Delimiter: {:?}", config.output.delimiter);

    println!("\nCategories ({}):", config.site.categories.len());
    for category in &config.site.categories {
        println!("  - {}", category);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics for the latest run
fn handle_stats(config: &Config) -> Result<()> {
    println!("Store: {}\n", config.output.store_path);

    let store = open_store(Path::new(&config.output.store_path))
        .with_context(|| format!("Failed to open store {}", config.output.store_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-only mode: rebuilds the table from stored records
fn handle_export_only(config: &Config) -> Result<()> {
    println!("=== Exporting Stored Records ===\n");
    println!("Store: {}", config.output.store_path);
    println!("Output: {}", config.output.csv_path);
    println!();

    let store = open_store(Path::new(&config.output.store_path))
        .with_context(|| format!("Failed to open store {}", config.output.store_path))?;
    let summary = export_latest(
        &store,
        Path::new(&config.output.csv_path),
        config.output.delimiter_byte(),
    )?;

    println!(
        "✓ Run {}: {} rows x {} columns exported to {}",
        summary.run_id,
        summary.rows,
        summary.columns,
        summary.path.display()
    );

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: &str, fresh: bool) -> Result<()> {
    if fresh {
        tracing::info!("Starting fresh harvest (ignoring stored progress)");
    } else {
        tracing::info!("Starting harvest (will resume an unfinished run)");
    }

    let summary = harvest(config, config_hash, fresh)
        .await
        .context("Harvest failed")?;

    tracing::info!(
        "Run {}: {} listing pages, {} products ({} extracted now, {} from earlier attempt)",
        summary.run_id,
        summary.listing_pages,
        summary.products_discovered,
        summary.products_extracted,
        summary.products_resumed
    );

    Ok(())
}
