//! CSS selectors for search-results parsing
//!
//! The site's markup varies across layout experiments, so every target is a
//! list tried in priority order. Update these lists when extraction starts
//! coming back empty.

use scraper::Selector;

/// Product card containers, most common layout first
pub const CARD_SELECTORS: &[&str] = &[
    "[data-id]",
    "[data-tkid]",
    "._75nlfW",
    ".CGtC98",
    ".cPHDOP.col-12-12",
    ".DOjaWF.gdgoEp",
];

/// Nodes whose presence means the product grid has rendered
pub const RENDER_WAIT_SELECTORS: &[&str] = &[
    "[data-id]",
    "[data-tkid]",
    ".DOjaWF.gdgoEp",
    ".tUxRFH",
    "._75nlfW",
    ".cPHDOP.col-12-12",
];

/// Product title, read from text or the `title` attribute
pub const TITLE_SELECTORS: &[&str] = &[
    ".KzDlHZ",
    "._4rR01T",
    ".IRpwTa",
    "._2WkVRV",
    "a[title]",
    "._2mylT6",
];

/// Displayed price
pub const PRICE_SELECTORS: &[&str] = &[
    ".Nx9bqj._4b5DiR",
    ".yRaY8j.ZYYwLA",
    "._3tbFF2",
    ".Ce9jPB",
    "._2_R_DZ",
    "._3auQ3N",
];

/// Product image element
pub const IMAGE_SELECTORS: &[&str] = &[
    "img[src]",
    ".DByuf4",
    "._2r_T1I img",
    ".CXW8mj img",
    ".yPq5Io",
    "img.DByuf4",
];

/// Image attributes checked in order; lazy-loaded images keep the real URL
/// in `data-src` or `data-original`
pub const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-original"];

/// Compiles a selector list, keeping the source text for logging
///
/// Entries that fail to parse are skipped with a warning.
pub(crate) fn compile(selectors: &[&'static str]) -> Vec<(&'static str, Selector)> {
    selectors
        .iter()
        .filter_map(|&source| match Selector::parse(source) {
            Ok(selector) => Some((source, selector)),
            Err(e) => {
                tracing::warn!("Skipping invalid selector '{}': {:?}", source, e);
                None
            }
        })
        .collect()
}
