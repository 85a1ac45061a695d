//! End-to-end scrape runs against a scripted page source
//!
//! The browser is replaced with canned result pages so the full cycle of
//! URL building, extraction, validation and persistence runs offline.

use async_trait::async_trait;
use product_scraper::config::Config;
use product_scraper::crawler::{Coordinator, PageError, PageSource, Scraper};
use product_scraper::storage::{ProductStore, SqliteStorage};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Serves prepared HTML per page number; unknown pages time out
struct CannedPages {
    pages: HashMap<u32, String>,
}

#[async_trait]
impl PageSource for CannedPages {
    async fn fetch_page(&mut self, url: &str) -> Result<String, PageError> {
        let page = Url::parse(url)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "page")
                    .and_then(|(_, v)| v.parse::<u32>().ok())
            })
            .unwrap_or(1);

        self.pages
            .get(&page)
            .cloned()
            .ok_or_else(|| PageError::RenderTimeout {
                url: url.to_string(),
                seconds: 20,
            })
    }
}

/// A results page with `count` complete product cards
fn results_page(term: &str, page: u32, count: usize) -> String {
    let cards: String = (0..count)
        .map(|i| {
            format!(
                r#"<div data-id="P{page}-{i}">
                     <a href="/p/{i}"><img class="DByuf4" src="https://img.example.com/{page}/{i}.jpg"></a>
                     <div class="KzDlHZ">{term} p{page} item {i}</div>
                     <div class="Nx9bqj _4b5DiR">₹{i},999</div>
                   </div>"#
            )
        })
        .collect();
    format!("<html><body><div class=\"DOjaWF\">{}</div></body></html>", cards)
}

async fn coordinator(pages: HashMap<u32, String>) -> Coordinator<CannedPages> {
    let config = Arc::new(Config {
        request_delay_seconds: 0.0,
        ..Config::default()
    });
    let store = SqliteStorage::new_in_memory().unwrap();
    store.init_schema().await.unwrap();

    Coordinator::new(config, CannedPages { pages }, Box::new(store))
}

#[tokio::test]
async fn test_two_pages_persist_all_products() {
    let pages = HashMap::from([
        (1, results_page("smartphone", 1, 10)),
        (2, results_page("smartphone", 2, 10)),
    ]);
    let mut coordinator = coordinator(pages).await;

    let summary = coordinator.scrape_and_save("smartphone", 2).await.unwrap();
    assert_eq!(summary.term, "smartphone");
    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.records_extracted, 20);
    assert_eq!(summary.records_persisted, 20);

    let newest = coordinator.store().query(5).await.unwrap();
    assert_eq!(newest.len(), 5);
    let titles: Vec<&str> = newest.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "smartphone p2 item 9",
            "smartphone p2 item 8",
            "smartphone p2 item 7",
            "smartphone p2 item 6",
            "smartphone p2 item 5",
        ]
    );

    let first = &newest[0];
    assert_eq!(first.price.as_deref(), Some("₹9,999"));
    assert_eq!(
        first.image_url.as_deref(),
        Some("https://img.example.com/2/9.jpg")
    );
}

#[tokio::test]
async fn test_timed_out_page_is_skipped() {
    let pages = HashMap::from([(1, results_page("laptop", 1, 4))]);
    let mut coordinator = coordinator(pages).await;

    let summary = coordinator.scrape_and_save("laptop", 2).await.unwrap();
    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.records_persisted, 4);

    let stored = coordinator.store().query(100).await.unwrap();
    assert!(stored.iter().all(|p| p.title.starts_with("laptop p1 ")));
}

#[tokio::test]
async fn test_cards_without_title_are_not_stored() {
    let html = r#"<html><body>
        <div data-id="A"><div class="KzDlHZ">Desk lamp</div><div class="Nx9bqj _4b5DiR">₹499</div></div>
        <div data-id="B"><div class="Nx9bqj _4b5DiR">₹999</div></div>
    </body></html>"#;
    let mut coordinator = coordinator(HashMap::from([(1, html.to_string())])).await;

    let summary = coordinator.scrape_and_save("lamp", 1).await.unwrap();
    assert_eq!(summary.records_persisted, 1);
    assert_eq!(summary.records_discarded, 1);

    let stored = coordinator.store().query(10).await.unwrap();
    assert_eq!(stored[0].title, "Desk lamp");
    assert_eq!(stored[0].image_url, None);
}

#[tokio::test]
async fn test_every_page_failing_persists_nothing() {
    let mut coordinator = coordinator(HashMap::new()).await;

    let summary = coordinator.scrape_and_save("ghost", 3).await.unwrap();
    assert_eq!(summary.pages_visited, 0);
    assert_eq!(summary.pages_failed, 3);
    assert_eq!(summary.records_persisted, 0);
    assert_eq!(coordinator.store().count().await.unwrap(), 0);
}
