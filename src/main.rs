//! Product scraper main entry point
//!
//! This is the command-line interface for the product scraper.

use anyhow::Context;
use clap::Parser;
use product_scraper::config::{load_config, Config, LogLevel};
use product_scraper::crawler::scrape;
use product_scraper::output::{clear_products, print_summary, prompt_line, show_products};
use product_scraper::storage::open_store;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Product Scraper: search-results harvesting into a database
///
/// Scrapes product titles, prices and images from the site's search results
/// and stores them. With no search term and no mode flag, asks for a term.
#[derive(Parser, Debug)]
#[command(name = "product-scraper")]
#[command(version)]
#[command(about = "Scrape product listings from search results into a database", long_about = None)]
struct Cli {
    /// Search term, e.g. "smartphone"
    #[arg(value_name = "TERM", conflicts_with_all = ["show", "clear"])]
    term: Option<String>,

    /// Number of result pages to scrape (defaults to pages_default from config)
    #[arg(
        short,
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        conflicts_with_all = ["show", "clear"]
    )]
    pages: Option<u32>,

    /// Show the N most recently stored products and exit
    #[arg(
        short,
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        conflicts_with = "clear"
    )]
    show: Option<u32>,

    /// Delete all stored products
    #[arg(long)]
    clear: bool,

    /// Do not ask for confirmation before --clear
    #[arg(short, long, requires = "clear")]
    yes: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is normal; variables already set take precedence
    let dotenv = dotenvy::dotenv();

    // The level comes from the config, so parse it before logging is up
    let loaded = load_config(&cli.config);
    let (level, log_file) = match &loaded {
        Ok(config) => (config.log_level, config.log_file.as_deref()),
        Err(_) => (LogLevel::Info, None),
    };
    setup_logging(level, cli.verbose, cli.quiet, log_file);

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = match loaded {
        Ok(config) => {
            tracing::debug!("Configuration loaded from {}", cli.config.display());
            Arc::new(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("invalid config {}", cli.config.display()));
        }
    };

    if cli.clear {
        handle_clear(&config, cli.yes).await
    } else if let Some(limit) = cli.show {
        handle_show(&config, limit).await
    } else {
        let pages = cli.pages.unwrap_or(config.pages_default);
        match cli.term {
            Some(term) => handle_scrape(config, &term, pages).await,
            None => handle_interactive(config, pages).await,
        }
    }
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise the config level applies to this
/// crate and `-v` raises it. With `log_file` set, the same events are also
/// appended to that file without colours.
fn setup_logging(level: LogLevel, verbose: u8, quiet: bool, log_file: Option<&Path>) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if let Ok(filter) = EnvFilter::try_from_default_env() {
        filter
    } else {
        match verbose {
            0 => {
                let others = if level == LogLevel::Error { "error" } else { "warn" };
                EnvFilter::new(format!("product_scraper={},{}", level.as_filter(), others))
            }
            1 => EnvFilter::new("product_scraper=debug,info"),
            2 => EnvFilter::new("product_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();
}

/// Opens `path` for appending, creating missing parent directories
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Handles the scrape mode
async fn handle_scrape(config: Arc<Config>, term: &str, pages: u32) -> anyhow::Result<()> {
    let term = term.trim();
    if term.is_empty() {
        anyhow::bail!("search term cannot be empty");
    }

    tracing::info!("Starting scraper for keyword: '{}'", term);

    match scrape(config, term, pages).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the no-argument mode: asks for a term, then scrapes
async fn handle_interactive(config: Arc<Config>, pages: u32) -> anyhow::Result<()> {
    println!("Product Scraper");
    println!("{}", "=".repeat(30));

    let term = prompt_line(
        &mut io::stdin().lock(),
        &mut io::stdout(),
        "Enter search keyword: ",
    )?;
    if term.is_empty() {
        println!("No keyword provided.");
        return Ok(());
    }

    handle_scrape(config, &term, pages).await
}

/// Handles the --show mode: lists the newest stored products
async fn handle_show(config: &Config, limit: u32) -> anyhow::Result<()> {
    let store = open_store(&config.database_target()?).await?;
    show_products(store.as_ref(), limit, &mut io::stdout()).await?;
    Ok(())
}

/// Handles the --clear mode: deletes all stored products after confirmation
async fn handle_clear(config: &Config, assume_yes: bool) -> anyhow::Result<()> {
    let store = open_store(&config.database_target()?).await?;
    let removed = clear_products(
        store.as_ref(),
        assume_yes,
        &mut io::stdin().lock(),
        &mut io::stdout(),
    )
    .await?;
    tracing::debug!("Clear finished, {} records removed", removed);
    Ok(())
}
