//! Crawler module for loading search-result pages and extracting products
//!
//! This module contains the core scraping logic, including:
//! - Search URL construction
//! - Browser-driven page loading with bounded waits
//! - Product card extraction with fallback selectors
//! - Overall run coordination and persistence

mod browser;
mod coordinator;
mod parser;
mod search;
pub mod selectors;

pub use browser::{ChromeBrowser, PageError, PageSource};
pub use coordinator::{Coordinator, ScrapeSummary, Scraper, SearchOutcome};
pub use parser::{extract_products, extract_products_with_stats, ParseStats, PartialRecord};
pub use search::search_url;

use crate::config::Config;
use crate::storage::open_store;
use crate::Result;
use std::sync::Arc;

/// Runs a complete scrape with a real browser
///
/// This is the main entry point for a scrape run. It will:
/// 1. Open the configured database (fatal on failure)
/// 2. Launch the browser (fatal on failure)
/// 3. Visit and parse each results page
/// 4. Store the collected products in one batch
/// 5. Close the browser, on success and on error
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `term` - Search term
/// * `pages` - Number of result pages to visit
pub async fn scrape(
    config: Arc<Config>,
    term: &str,
    pages: u32,
) -> Result<ScrapeSummary> {
    let target = config.database_target()?;
    let store = open_store(&target).await?;

    let browser = ChromeBrowser::launch(&config).await?;
    let mut coordinator = Coordinator::new(config, browser, store);

    let result = coordinator.scrape_and_save(term, pages).await;
    coordinator.close().await;

    result
}
