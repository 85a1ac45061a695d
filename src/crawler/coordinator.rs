//! Scrape coordinator - main orchestration logic
//!
//! This module contains the page loop that ties the other parts together:
//! - Building the search URL for each results page
//! - Loading pages through a [`PageSource`]
//! - Extracting products from the rendered HTML
//! - Throttling between pages
//! - Persisting the accumulated batch

use crate::config::Config;
use crate::crawler::browser::PageSource;
use crate::crawler::parser::{extract_products, extract_products_with_stats, PartialRecord};
use crate::crawler::search::search_url;
use crate::storage::{NewProduct, ProductStore};
use crate::ScraperError;
use async_trait::async_trait;
use std::sync::Arc;

/// Capabilities of a product scraper
#[async_trait]
pub trait Scraper {
    /// Visits up to `pages` result pages for `term` and collects products
    async fn search_products(&mut self, term: &str, pages: u32)
        -> Result<SearchOutcome, ScraperError>;

    /// Extracts products from one page of HTML
    fn parse_product_data(&self, html: &str) -> Vec<PartialRecord>;

    /// Searches, then stores everything found in one batch
    async fn scrape_and_save(&mut self, term: &str, pages: u32)
        -> Result<ScrapeSummary, ScraperError>;
}

/// Products and page counters collected by a search
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub records: Vec<PartialRecord>,
    pub pages_requested: u32,
    pub pages_visited: u32,
    pub pages_failed: u32,
    pub cards_discarded: usize,
}

/// Result of a complete scrape run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub term: String,
    /// Pages attempted (after clamping to `max_pages`)
    pub pages_requested: u32,
    /// Pages that loaded and were parsed
    pub pages_visited: u32,
    /// Pages skipped after a navigation or render failure
    pub pages_failed: u32,
    /// Records with a title extracted across all pages
    pub records_extracted: usize,
    /// Cards or records dropped for a missing title or failed validation
    pub records_discarded: usize,
    pub records_persisted: u64,
}

/// Main scraper coordinator structure
pub struct Coordinator<P: PageSource> {
    config: Arc<Config>,
    source: P,
    store: Box<dyn ProductStore>,
}

impl<P: PageSource> Coordinator<P> {
    /// Creates a coordinator over an already launched page source and an
    /// opened store
    pub fn new(config: Arc<Config>, source: P, store: Box<dyn ProductStore>) -> Self {
        Self {
            config,
            source,
            store,
        }
    }

    /// The store records are written to
    pub fn store(&self) -> &dyn ProductStore {
        self.store.as_ref()
    }

    /// Closes the page source
    pub async fn close(&mut self) {
        self.source.close().await;
    }

    /// Converts parsed cards into insertable products, dropping invalid ones
    fn prepare_batch(records: Vec<PartialRecord>) -> (Vec<NewProduct>, usize) {
        let mut batch = Vec::with_capacity(records.len());
        let mut dropped = 0;

        for record in records {
            match record.into_product() {
                Some(product) => match product.validate() {
                    Ok(()) => batch.push(product),
                    Err(reason) => {
                        tracing::warn!("Dropping product '{}': {}", product.title, reason);
                        dropped += 1;
                    }
                },
                None => dropped += 1,
            }
        }

        (batch, dropped)
    }
}

#[async_trait]
impl<P: PageSource> Scraper for Coordinator<P> {
    async fn search_products(
        &mut self,
        term: &str,
        pages: u32,
    ) -> Result<SearchOutcome, ScraperError> {
        let pages_requested = self.config.effective_pages(pages);
        if pages_requested < pages {
            tracing::warn!(
                "Requested {} pages, limited to max_pages = {}",
                pages,
                pages_requested
            );
        }

        let delay = self.config.request_delay();
        let mut outcome = SearchOutcome {
            pages_requested,
            ..SearchOutcome::default()
        };

        for page_num in 1..=pages_requested {
            let url = search_url(&self.config.base_url, term, page_num)?;

            match self.source.fetch_page(url.as_str()).await {
                Ok(html) => {
                    let (products, stats) = extract_products_with_stats(&html);
                    tracing::info!("Page {}: Found {} products", page_num, products.len());
                    outcome.pages_visited += 1;
                    outcome.cards_discarded += stats.cards_discarded;
                    outcome.records.extend(products);
                }
                Err(e) => {
                    tracing::warn!("Skipping page {}: {}", page_num, e);
                    outcome.pages_failed += 1;
                }
            }

            if page_num < pages_requested && !delay.is_zero() {
                tracing::debug!("Waiting {:?} before next page", delay);
                tokio::time::sleep(delay).await;
            }
        }

        tracing::info!("Total products found: {}", outcome.records.len());
        Ok(outcome)
    }

    fn parse_product_data(&self, html: &str) -> Vec<PartialRecord> {
        extract_products(html)
    }

    async fn scrape_and_save(
        &mut self,
        term: &str,
        pages: u32,
    ) -> Result<ScrapeSummary, ScraperError> {
        tracing::info!("Starting scrape for keyword: '{}' ({} pages)", term, pages);
        tracing::info!("Products in database before: {}", self.store.count().await?);

        let outcome = self.search_products(term, pages).await?;
        let records_extracted = outcome.records.len();
        let (batch, dropped) = Self::prepare_batch(outcome.records);

        let records_persisted = if batch.is_empty() {
            tracing::warn!("No products found to save");
            0
        } else {
            self.store.insert_batch(&batch).await?
        };

        tracing::info!(
            "Successfully saved {} products to database",
            records_persisted
        );
        tracing::info!("Products in database after: {}", self.store.count().await?);

        Ok(ScrapeSummary {
            term: term.trim().to_string(),
            pages_requested: outcome.pages_requested,
            pages_visited: outcome.pages_visited,
            pages_failed: outcome.pages_failed,
            records_extracted,
            records_discarded: outcome.cards_discarded + dropped,
            records_persisted,
        })
    }
}
