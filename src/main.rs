//! Ripple Frontier main entry point
//!
//! This is the command-line interface for the Ripple Frontier crawler.

use anyhow::{bail, Context};
use clap::Parser;
use ripple_frontier::config::{load_config_with_hash, Config};
use ripple_frontier::crawler::crawl;
use ripple_frontier::frontier::{SeedList, SeedSource};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Ripple Frontier: a concurrent crawler with URL and content deduplication
///
/// Ripple Frontier fetches pages with several workers, follows their links
/// through a bounded in-memory frontier backed by a durable queue, and
/// archives every page whose URL and content have not been seen before.
/// Interrupt with Ctrl-C; the next start resumes from the durable queue.
#[derive(Parser, Debug)]
#[command(name = "ripple-frontier")]
#[command(version = "1.0.0")]
#[command(about = "A deduplicating crawl frontier", long_about = None)]
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

    /// Start a fresh crawl, clearing the durable queue and visited registry
    #[arg(long)]
    fresh: bool,

    /// Override the configured number of crawl workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Some(workers) = cli.workers {
        if workers == 0 || workers > 64 {
            bail!("--workers must be between 1 and 64, got {}", workers);
        }
        config.crawler.workers = workers;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_frontier=info,warn"),
            1 => EnvFilter::new("ripple_frontier=debug,info"),
            2 => EnvFilter::new("ripple_frontier=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Ripple Frontier Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Frontier capacity: {}", config.crawler.frontier_capacity);
    println!("  Wait timeout: {}ms", config.crawler.wait_timeout_ms);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  Max redirects: {}", config.fetch.max_redirects);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Documents: {}", config.archive.documents_dir);

    let seeds = SeedList::from_config(&config.seeds)
        .seeds()
        .context("failed to read seeds")?;
    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ A cold start would begin with {} seed URLs", seeds.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use ripple_frontier::output::{load_statistics, print_statistics};
    use ripple_frontier::storage::SqliteStorage;
    use std::path::Path;

    println!("Database: {}\n", config.storage.database_path);

    // Open the database
    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))
        .context("failed to open database")?;

    // Load statistics
    let stats = load_statistics(&storage)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (resumes from the durable queue if present)");
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            interrupt.cancel();
        }
    });

    // Run the crawler
    match crawl(config, fresh, cancel).await {
        Ok(report) => {
            tracing::info!("Crawl stopped cleanly");
            println!("\n=== Crawl Report ===\n{}", report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
