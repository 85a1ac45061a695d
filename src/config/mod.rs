//! Configuration module for the product scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The resulting [`Config`] is immutable and is passed explicitly to the parts
//! of the program that need it.
//!
//! # Example
//!
//! ```no_run
//! use product_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Delay between pages: {:?}", config.request_delay());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, LogLevel};

// Re-export parser functions
pub use parser::{load_config, load_config_with_env, parse_config, DATABASE_URL_ENV};
