//! HTML parser for extracting product cards
//!
//! This module turns a rendered search-results page into partial product
//! records. Each target (card, title, price, image) has an ordered list of
//! extraction rules; the first rule that yields a value wins.
//!
//! Extraction never fails: missing nodes produce fewer or emptier records.

use crate::crawler::selectors::{
    compile, CARD_SELECTORS, IMAGE_ATTRIBUTES, IMAGE_SELECTORS, PRICE_SELECTORS, TITLE_SELECTORS,
};
use crate::storage::NewProduct;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Product fields pulled from one card
///
/// Any field may be missing; cards without a title are never returned by
/// [`extract_products`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub title: Option<String>,
    pub price: Option<String>,
    pub image_url: Option<String>,
}

impl PartialRecord {
    /// Converts into an insertable product, or `None` without a usable title
    pub fn into_product(self) -> Option<NewProduct> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        Some(NewProduct {
            title,
            price: self.price,
            image_url: self.image_url,
        })
    }
}

/// Counters from one parsed page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Card nodes matched by the winning card selector
    pub cards_found: usize,

    /// Cards dropped because no title could be extracted
    pub cards_discarded: usize,
}

/// How a matched node is turned into a value
#[derive(Debug, Clone, Copy)]
enum Read {
    /// Trimmed text content, falling back to the `title` attribute
    Text,
    /// First absolute-looking URL among [`IMAGE_ATTRIBUTES`]
    ImageSource,
}

/// One extraction function: a selector plus a way of reading the match
struct FieldRule {
    source: &'static str,
    selector: Selector,
    read: Read,
}

impl FieldRule {
    fn extract(&self, card: ElementRef<'_>) -> Option<String> {
        let node = card.select(&self.selector).next()?;
        match self.read {
            Read::Text => text_or_title(node),
            Read::ImageSource => image_source(node),
        }
    }
}

fn rules(selectors: &[&'static str], read: Read) -> Vec<FieldRule> {
    compile(selectors)
        .into_iter()
        .map(|(source, selector)| FieldRule {
            source,
            selector,
            read,
        })
        .collect()
}

static CARD_RULES: LazyLock<Vec<(&'static str, Selector)>> =
    LazyLock::new(|| compile(CARD_SELECTORS));
static TITLE_RULES: LazyLock<Vec<FieldRule>> =
    LazyLock::new(|| rules(TITLE_SELECTORS, Read::Text));
static PRICE_RULES: LazyLock<Vec<FieldRule>> =
    LazyLock::new(|| rules(PRICE_SELECTORS, Read::Text));
static IMAGE_RULES: LazyLock<Vec<FieldRule>> =
    LazyLock::new(|| rules(IMAGE_SELECTORS, Read::ImageSource));

/// Extracts product records from a search-results page
///
/// # Algorithm
///
/// 1. Locate card nodes with the first card selector that matches anything
/// 2. For each card, try the title, price and image rules independently
/// 3. Drop cards without a title
///
/// Price text is returned as displayed (currency symbols, separators and
/// ranges are kept); only surrounding whitespace is trimmed.
///
/// # Example
///
/// ```
/// use product_scraper::crawler::extract_products;
///
/// let html = r#"<div data-id="A1"><div class="KzDlHZ">Phone X</div>
///     <div class="Nx9bqj _4b5DiR">₹9,999</div></div>"#;
/// let products = extract_products(html);
/// assert_eq!(products[0].title.as_deref(), Some("Phone X"));
/// assert_eq!(products[0].price.as_deref(), Some("₹9,999"));
/// ```
pub fn extract_products(html: &str) -> Vec<PartialRecord> {
    extract_products_with_stats(html).0
}

/// Like [`extract_products`], also reporting card counts
pub fn extract_products_with_stats(html: &str) -> (Vec<PartialRecord>, ParseStats) {
    let document = Html::parse_document(html);
    let mut stats = ParseStats::default();

    let cards = find_cards(&document);
    if cards.is_empty() {
        tracing::warn!("No product elements found with any selector");
        return (Vec::new(), stats);
    }
    stats.cards_found = cards.len();

    let mut products = Vec::with_capacity(cards.len());
    for card in cards {
        let record = extract_card(card);
        if record.title.is_some() {
            products.push(record);
        } else {
            stats.cards_discarded += 1;
        }
    }

    if stats.cards_discarded > 0 {
        tracing::debug!("Discarded {} cards without a title", stats.cards_discarded);
    }
    tracing::info!("Successfully parsed {} products", products.len());

    (products, stats)
}

/// Card nodes from the first selector with at least one match
fn find_cards(document: &Html) -> Vec<ElementRef<'_>> {
    CARD_RULES
        .iter()
        .find_map(|(source, selector)| {
            let cards: Vec<_> = document.select(selector).collect();
            if cards.is_empty() {
                None
            } else {
                tracing::debug!("Found {} products with selector: {}", cards.len(), source);
                Some(cards)
            }
        })
        .unwrap_or_default()
}

fn extract_card(card: ElementRef<'_>) -> PartialRecord {
    PartialRecord {
        title: first_match(card, &TITLE_RULES),
        price: first_match(card, &PRICE_RULES),
        image_url: first_match(card, &IMAGE_RULES),
    }
}

/// Tries each rule in order, returning the first value produced
fn first_match(card: ElementRef<'_>, rules: &[FieldRule]) -> Option<String> {
    rules.iter().find_map(|rule| {
        let value = rule.extract(card);
        if value.is_some() {
            tracing::trace!("Field matched by {}", rule.source);
        }
        value
    })
}

fn text_or_title(node: ElementRef<'_>) -> Option<String> {
    let text = node.text().collect::<String>();
    let text = text.trim();
    if !text.is_empty() {
        return Some(text.to_string());
    }

    node.value()
        .attr("title")
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}

fn image_source(node: ElementRef<'_>) -> Option<String> {
    IMAGE_ATTRIBUTES.iter().find_map(|attr| {
        node.value()
            .attr(attr)
            .map(str::trim)
            .filter(|url| url.starts_with("http") || url.starts_with("//"))
            .map(str::to_string)
    })
}
