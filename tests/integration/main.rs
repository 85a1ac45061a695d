//! Integration tests for the product scraper

mod scrape_tests;
mod storage_tests;
