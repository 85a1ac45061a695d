//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ProductStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ProductStore, StorageError, StorageResult};
use crate::storage::{validate_batch, NewProduct, ProductRecord};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) a SQLite database file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            StorageError::Connection(format!("cannot open {}: {}", path.display(), e))
        })?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection lock poisoned".to_string()))
    }
}

/// Fixed-width UTC timestamp, so text order equals time order
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The current time, or `latest` if the clock is behind it
fn timestamp_after(latest: Option<&str>) -> String {
    let now = timestamp_now();
    match latest {
        Some(latest) if latest > now.as_str() => latest.to_string(),
        _ => now,
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
    let created_at: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(ProductRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        image_url: row.get(2)?,
        price: row.get(3)?,
        created_at,
    })
}

#[async_trait]
impl ProductStore for SqliteStorage {
    async fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        initialize_schema(&conn)?;
        Ok(())
    }

    async fn insert_batch(&self, products: &[NewProduct]) -> StorageResult<u64> {
        validate_batch(products)?;

        if products.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        // Dropping an uncommitted transaction rolls it back
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO product_info (title, image_url, price, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;

            let mut latest: Option<String> =
                tx.query_row("SELECT MAX(created_at) FROM product_info", [], |row| {
                    row.get(0)
                })?;

            for product in products {
                let created_at = timestamp_after(latest.as_deref());
                stmt.execute(params![
                    product.title,
                    product.image_url,
                    product.price,
                    created_at
                ])?;
                latest = Some(created_at);
            }
        }
        tx.commit()?;

        tracing::info!("Batch inserted {} products", products.len());
        Ok(products.len() as u64)
    }

    async fn query(&self, limit: u32) -> StorageResult<Vec<ProductRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, image_url, price, created_at FROM product_info
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    async fn count(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM product_info", [], |row| {
            row.get(0)
        })?;
        Ok(count as u64)
    }

    async fn clear_all(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM product_info", [])?;
        tracing::info!("Cleared {} products from database", removed);
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn new_store() -> SqliteStorage {
        let storage = SqliteStorage::new_in_memory().unwrap();
        storage.init_schema().await.unwrap();
        storage
    }

    fn product(n: usize) -> NewProduct {
        NewProduct::new(format!("Product {}", n))
            .with_price(format!("₹{},999", n))
            .with_image_url(format!("https://img.example.com/{}.jpg", n))
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.init_schema().await.is_ok());
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let storage = new_store().await;
        let inserted = storage
            .insert_batch(&[product(1), product(2), product(3)])
            .await
            .unwrap();
        assert_eq!(inserted, 3);

        let records = storage.query(10).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].title, "Product 3");
        assert_eq!(records[0].price.as_deref(), Some("₹3,999"));
        assert_eq!(records[2].title, "Product 1");
        assert!(records[0].id > records[1].id);
    }

    #[tokio::test]
    async fn test_query_is_newest_first_across_batches() {
        let storage = new_store().await;
        storage.insert_batch(&[product(1), product(2)]).await.unwrap();
        storage.insert_batch(&[product(3)]).await.unwrap();

        let records = storage.query(2).await.unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Product 3", "Product 2"]);
        assert!(records[0].created_at >= records[1].created_at);
    }

    #[tokio::test]
    async fn test_created_at_never_moves_backwards() {
        let storage = new_store().await;
        let ahead = "2999-01-01T00:00:00.000000Z";
        storage
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO product_info (title, created_at) VALUES ('From the future', ?1)",
                params![ahead],
            )
            .unwrap();

        storage.insert_batch(&[product(1), product(2)]).await.unwrap();

        let records = storage.query(3).await.unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Product 2", "Product 1", "From the future"]);
        assert!(records.iter().all(|r| r.created_at == records[2].created_at));
    }

    #[test]
    fn test_timestamp_after() {
        let ahead = "2999-01-01T00:00:00.000000Z";
        assert_eq!(timestamp_after(Some(ahead)), ahead);

        let behind = "2000-01-01T00:00:00.000000Z";
        assert!(timestamp_after(Some(behind)).as_str() > behind);
        assert_eq!(timestamp_after(None).len(), ahead.len());
    }

    #[tokio::test]
    async fn test_query_is_repeatable() {
        let storage = new_store().await;
        storage
            .insert_batch(&(1..=6).map(product).collect::<Vec<_>>())
            .await
            .unwrap();

        let first = storage.query(4).await.unwrap();
        let second = storage.query(4).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_optional_fields_round_trip_as_none() {
        let storage = new_store().await;
        storage
            .insert_batch(&[NewProduct::new("Bare listing")])
            .await
            .unwrap();

        let records = storage.query(1).await.unwrap();
        assert_eq!(records[0].price, None);
        assert_eq!(records[0].image_url, None);
    }

    #[tokio::test]
    async fn test_invalid_record_rejects_whole_batch() {
        let storage = new_store().await;
        let mut batch: Vec<_> = (1..=5).map(product).collect();
        batch.push(NewProduct::new(""));

        let result = storage.insert_batch(&batch).await;
        assert!(matches!(
            result,
            Err(StorageError::InvalidRecord { index: 5, .. })
        ));
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_transaction_rolls_back() {
        let storage = new_store().await;
        {
            let conn = storage.lock().unwrap();
            conn.execute_batch(
                "CREATE TRIGGER reject_poison BEFORE INSERT ON product_info
                 WHEN NEW.title = 'poison'
                 BEGIN SELECT RAISE(ABORT, 'poisoned row'); END;",
            )
            .unwrap();
        }

        let batch = vec![product(1), product(2), NewProduct::new("poison"), product(4)];
        assert!(storage.insert_batch(&batch).await.is_err());
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let storage = new_store().await;
        assert_eq!(storage.insert_batch(&[]).await.unwrap(), 0);
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let storage = new_store().await;
        storage.insert_batch(&[product(1)]).await.unwrap();
        storage.insert_batch(&[product(1)]).await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let storage = new_store().await;
        storage
            .insert_batch(&[product(1), product(2)])
            .await
            .unwrap();

        assert_eq!(storage.clear_all().await.unwrap(), 2);
        assert!(storage.query(10).await.unwrap().is_empty());
        assert_eq!(storage.clear_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.db");

        {
            let storage = SqliteStorage::new(&path).unwrap();
            storage.init_schema().await.unwrap();
            storage.insert_batch(&[product(1)]).await.unwrap();
        }

        let reopened = SqliteStorage::new(&path).unwrap();
        reopened.init_schema().await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }
}
