//! Mapsift main entry point
//!
//! Command-line interface for the map-application venue crawler.

use clap::Parser;
use mapsift::config::load_config_with_hash;
use mapsift::crawler::run_crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Mapsift: a resumable venue crawler for map-style web applications
///
/// Mapsift drives a browser session through search, detail, and sub-list
/// views, extracting venue records with their sub-items into deduplicated
/// CSV tables. Long runs are checkpointed and resume automatically after
/// an interruption.
#[derive(Parser, Debug)]
#[command(name = "mapsift")]
#[command(version = "0.3.0")]
#[command(about = "A resumable map-app venue crawler", long_about = None)]
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

    /// Start a fresh crawl, ignoring any existing checkpoint
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the existing output tables and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, &config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mapsift=info,warn"),
            1 => EnvFilter::new("mapsift=debug,info"),
            2 => EnvFilter::new("mapsift=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &mapsift::Config) {
    println!("=== Mapsift Dry Run ===\n");

    println!("Traversal:");
    println!("  Max entries per query: {}", config.crawl.max_entries_per_query);
    println!("  Max sub-items per record: {}", config.crawl.max_sub_items);
    match config.crawl.target_record_count {
        Some(target) => println!("  Target record count: {}", target),
        None => println!("  Target record count: unlimited"),
    }
    println!("  Checkpoint interval: {}", config.crawl.checkpoint_interval);

    println!("\nPacing:");
    println!("  Step delay: {}ms", config.delays.step_ms);
    println!("  Record delay: {}ms", config.delays.record_ms);
    println!("  Query delay: {}ms", config.delays.query_ms);
    println!("  Frame timeout: {}ms", config.delays.frame_timeout_ms);

    println!("\nFilters:");
    println!("  Region markers: {:?}", config.filter.region_markers);
    println!(
        "  Content-signal check: {}",
        if config.filter.signal_keywords_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "  Exclusion keywords: {} terms",
        config.filter.exclusion_keywords.len()
    );

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Sub-items: {}", config.output.sub_items_path);
    println!("  Run log: {}", config.output.run_log_path);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    println!("\nQueries ({}):", config.search.queries.len());
    for query in &config.search.queries {
        println!("  - {}", query);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarizes existing output tables
fn handle_stats(config: &mapsift::Config) -> anyhow::Result<()> {
    use mapsift::output::{load_stats, print_stats};

    println!("Records table: {}\n", config.output.records_path);
    let stats = load_stats(&config.output)?;
    print_stats(&stats);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: mapsift::Config,
    config_hash: &str,
    fresh: bool,
) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous checkpoint)");
    } else {
        tracing::info!("Starting crawl (will resume if a checkpoint exists)");
    }

    match run_crawl(config, config_hash, fresh).await {
        Ok(summary) => {
            println!(
                "Crawl completed: {} records, {} sub-items{}{}",
                summary.records,
                summary.sub_items,
                if summary.resumed { " (resumed)" } else { "" },
                if summary.target_reached {
                    " (target reached)"
                } else {
                    ""
                }
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
