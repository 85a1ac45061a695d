//! Console reports for stored products and finished runs
//!
//! Each report has a `format_*` function returning the text. Run summaries
//! also have a `print_*` wrapper writing to stdout.

use crate::crawler::ScrapeSummary;
use crate::storage::ProductRecord;
use std::fmt::Write;

/// Image URLs longer than this are shortened in listings
const IMAGE_DISPLAY_LEN: usize = 80;

/// Formats stored products as a numbered listing
pub fn format_products(products: &[ProductRecord]) -> String {
    if products.is_empty() {
        return "No products found in database.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "--- Showing {} products ---", products.len());

    for (i, product) in products.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}. {}", i + 1, product.title);
        let _ = writeln!(out, "   Price: {}", product.price.as_deref().unwrap_or("N/A"));
        let _ = writeln!(
            out,
            "   Image: {}",
            shorten(product.image_url.as_deref().unwrap_or(""), IMAGE_DISPLAY_LEN)
        );
        let _ = writeln!(
            out,
            "   Added: {}",
            product.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    out
}

/// Formats the counters of a finished run
pub fn format_summary(summary: &ScrapeSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Scrape Summary: '{}' ===", summary.term);
    let _ = writeln!(
        out,
        "  Pages visited: {} of {}",
        summary.pages_visited, summary.pages_requested
    );
    if summary.pages_failed > 0 {
        let _ = writeln!(out, "  Pages skipped: {}", summary.pages_failed);
    }
    let _ = writeln!(out, "  Records extracted: {}", summary.records_extracted);
    if summary.records_discarded > 0 {
        let _ = writeln!(out, "  Records discarded: {}", summary.records_discarded);
    }
    let _ = writeln!(out, "  Records persisted: {}", summary.records_persisted);
    out
}

/// Prints run counters to stdout
pub fn print_summary(summary: &ScrapeSummary) {
    print!("{}", format_summary(summary));
}

/// Truncates to `max` characters, marking the cut with `...`
fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}
