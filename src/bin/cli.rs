//! CLI binary for memehub.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use meme_search::{Aggregator, Registry};
use memehub::config::{self, AppConfig};
use memehub::output;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// memehub: search meme stickers across multiple sources at once.
#[derive(Parser)]
#[command(name = "memehub", version, about)]
struct Cli {
    /// Search keyword.
    #[arg(short, long)]
    keyword: Option<String>,

    /// Comma-separated source ids (default: all sources).
    #[arg(short, long, value_delimiter = ',')]
    sources: Vec<String>,

    /// Results per source [default: 10].
    #[arg(short, long)]
    limit: Option<usize>,

    /// Result page [default: 1].
    #[arg(short, long)]
    page: Option<u32>,

    /// Per-source timeout in seconds [default: 15].
    #[arg(short, long)]
    timeout: Option<u64>,

    /// List available sources and exit.
    #[arg(long)]
    list: bool,

    /// Print JSON instead of a summary.
    #[arg(long)]
    json: bool,

    /// Show full URLs and debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results only.
    let filter = config::log_filter(
        std::env::var("RUST_LOG").ok().as_deref(),
        std::env::var(config::ENV_LOG_LEVEL).ok().as_deref(),
        cli.verbose,
    );
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let app_config = AppConfig::load(cli.config.as_deref())?;
    let registry = Arc::new(Registry::with_builtin_providers(&app_config.sources)?);
    info!(sources = ?registry.ids(), "registry ready");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.list {
        output::write_sources(&mut out, &registry.descriptors(), cli.json)?;
        return Ok(());
    }

    let keyword = cli.keyword.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        eprintln!("error: a search keyword is required");
        eprintln!("usage: memehub -k <KEYWORD> [-s sougou,doutub] [-l 10] [--json]");
        eprintln!("       memehub --list");
        std::process::exit(1);
    }

    let mut options = app_config.search.options();
    if let Some(limit) = cli.limit {
        options.limit = limit;
    }
    if let Some(page) = cli.page {
        options.page = page;
    }
    if let Some(secs) = cli.timeout {
        options.timeout = Duration::from_secs(secs);
    }

    // Handle Ctrl+C
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, cancelling search...");
            cancel_clone.cancel();
        }
    });

    let aggregator = Aggregator::new(registry);
    let report = aggregator
        .search_subset(keyword, cli.sources.as_slice(), &options, &cancel)
        .await?;

    if cli.json {
        output::write_report_json(&mut out, &report)?;
    } else {
        output::write_report_pretty(&mut out, &report, cli.verbose)?;
    }
    out.flush()?;
    Ok(())
}
