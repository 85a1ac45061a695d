//! Product Scraper: search-results harvesting into a relational table
//!
//! This crate drives a headless Chromium browser through the paginated search
//! results of an e-commerce site, extracts product cards (title, price, image)
//! with ordered fallback selectors, and persists them to SQLite or PostgreSQL.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid search URL: {0}")]
    SearchUrl(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{extract_products, Coordinator, PartialRecord, ScrapeSummary, Scraper};
pub use storage::{NewProduct, ProductRecord, ProductStore, StorageError};
