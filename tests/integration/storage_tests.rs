//! Storage behaviour through the public store API

use product_scraper::storage::{open_store, DatabaseTarget, NewProduct, StorageError};
use tempfile::TempDir;

fn products(count: usize) -> Vec<NewProduct> {
    (0..count)
        .map(|i| {
            NewProduct::new(format!("Product {}", i))
                .with_price(format!("₹{}", 100 * (i + 1)))
                .with_image_url(format!("https://img.example.com/{}.jpg", i))
        })
        .collect()
}

#[tokio::test]
async fn test_clear_on_empty_database() {
    let store = open_store(&DatabaseTarget::SqliteMemory).await.unwrap();
    assert_eq!(store.clear_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_record_rejects_whole_batch() {
    let store = open_store(&DatabaseTarget::SqliteMemory).await.unwrap();

    let mut batch = products(5);
    batch.push(NewProduct::new("x".repeat(501)));

    match store.insert_batch(&batch).await {
        Err(StorageError::InvalidRecord { index, .. }) => assert_eq!(index, 5),
        other => panic!("expected InvalidRecord, got {:?}", other),
    }
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_clear_then_query_is_empty() {
    let store = open_store(&DatabaseTarget::SqliteMemory).await.unwrap();
    store.insert_batch(&products(3)).await.unwrap();

    assert_eq!(store.clear_all().await.unwrap(), 3);
    assert!(store.query(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("products.db").display());
    let target = DatabaseTarget::parse(&url).unwrap();

    {
        let store = open_store(&target).await.unwrap();
        assert_eq!(store.insert_batch(&products(2)).await.unwrap(), 2);
    }

    let store = open_store(&target).await.unwrap();
    let stored = store.query(10).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].title, "Product 1");
    assert_eq!(stored[1].title, "Product 0");
}
