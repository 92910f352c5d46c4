//! Upload-Tracker main entry point
//!
//! This is the command-line interface for the campaign upload tracker.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use upload_tracker::config::{load_config_with_hash, validate, Config};
use upload_tracker::crawler::run_crawl;
use upload_tracker::output::print_summary;
use upload_tracker::queue::{QueueLayout, WorkQueueReader};
use upload_tracker::retry::RetryPolicy;
use upload_tracker::storage::SheetsClient;
use upload_tracker::url::spreadsheet_id_from_input;

/// Upload-Tracker: finds campaign posts on creators' feeds
///
/// Reads creator profiles and blogs from a spreadsheet work queue, walks
/// each feed for recent posts mentioning every campaign keyword, and writes
/// the first match (or the reason there is none) back into the sheet.
#[derive(Parser, Debug)]
#[command(name = "upload-tracker")]
#[command(version)]
#[command(about = "Tracks campaign uploads across creator feeds", long_about = None)]
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

    /// Override the campaign keyword (comma-separated terms)
    #[arg(long)]
    keyword: Option<String>,

    /// Override the recency window in days
    #[arg(long)]
    window_days: Option<u32>,

    /// Override the per-target post cap
    #[arg(long)]
    post_cap: Option<u32>,

    /// Override the sheet (tab) holding the work queue
    #[arg(long)]
    sheet: Option<String>,

    /// List the targets that would be crawled without crawling them
    #[arg(long, conflicts_with = "list_sheets")]
    dry_run: bool,

    /// List the sheet names of the spreadsheet and exit
    #[arg(long, conflicts_with = "dry_run")]
    list_sheets: bool,
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

    apply_overrides(&mut config, &cli)?;

    // Handle different modes
    if cli.list_sheets {
        handle_list_sheets(&config).await
    } else if cli.dry_run {
        handle_dry_run(&config).await
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("upload_tracker=info,warn"),
            1 => EnvFilter::new("upload_tracker=debug,info"),
            2 => EnvFilter::new("upload_tracker=trace,debug"),
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

/// Applies command-line overrides and re-validates the result
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(keyword) = &cli.keyword {
        config.search.keyword = keyword.clone();
    }
    if let Some(days) = cli.window_days {
        config.search.window_days = days;
    }
    if let Some(cap) = cli.post_cap {
        config.search.post_cap = cap;
    }
    if let Some(sheet) = &cli.sheet {
        config.queue.sheet = sheet.clone();
    }

    validate(config).context("invalid command-line override")?;
    Ok(())
}

fn sheets_client(config: &Config) -> anyhow::Result<SheetsClient> {
    let spreadsheet_id = spreadsheet_id_from_input(&config.queue.spreadsheet)?;
    Ok(SheetsClient::from_env(&config.sheets_api, &spreadsheet_id)?)
}

/// Handles the --list-sheets mode: prints every sheet title
async fn handle_list_sheets(config: &Config) -> anyhow::Result<()> {
    let client = sheets_client(config)?;
    let titles = client.list_sheets().await?;

    println!("=== Sheets in {} ===\n", config.queue.spreadsheet);
    for (i, title) in titles.iter().enumerate() {
        println!("  {}. {}", i + 1, title);
    }
    Ok(())
}

/// Handles the --dry-run mode: shows the eligible targets without crawling
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let client = sheets_client(config)?;
    let layout = QueueLayout::from_config(&config.queue)?;
    let reader = WorkQueueReader::new(layout, RetryPolicy::from_config(&config.sync));
    let targets = reader.load_eligible_targets(&client).await?;

    println!("=== Upload-Tracker Dry Run ===\n");

    println!("Search:");
    println!("  Keyword: {}", config.search.keyword);
    println!("  Window: {} days", config.search.window_days);
    println!("  Post cap: {}", config.search.post_cap);
    println!("  Pinned posts: {}", config.search.pinned_posts);

    println!("\nQueue:");
    println!("  Sheet: {}", config.queue.sheet);
    println!("  Columns: {}", config.queue.columns);

    println!("\nEligible Targets ({}):", targets.len());
    for target in &targets {
        println!(
            "  - row {:>4}  {:<24} {}",
            target.source_row, target.display_name, target.canonical_url
        );
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Searching '{}' within {} days (cap {} posts, driver {:?})",
        config.search.keyword,
        config.search.window_days,
        config.search.post_cap,
        config.browser.driver
    );

    match run_crawl(config).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run aborted: {}", e);
            Err(e.into())
        }
    }
}
