//! Output module for console reports
//!
//! This module handles:
//! - Listing stored products for `--show`
//! - Clearing the store for `--clear`, with confirmation
//! - Summarising a finished scrape run

pub mod maintenance;
pub mod stats;

pub use maintenance::{clear_products, prompt_line, show_products};
pub use stats::{format_products, format_summary, print_summary};
