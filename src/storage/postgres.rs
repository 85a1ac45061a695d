//! PostgreSQL storage implementation
//!
//! Client/server backend for the ProductStore trait, built on a single-connection
//! sqlx pool. The connection lives for one run and is never shared.

use crate::storage::schema::POSTGRES_SCHEMA_SQL;
use crate::storage::traits::{ProductStore, StorageError, StorageResult};
use crate::storage::{validate_batch, NewProduct, ProductRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// `created_at` never falls behind the newest stored row, even if the
/// server clock steps back
const INSERT_SQL: &str = "INSERT INTO product_info (title, image_url, price, created_at)
     VALUES ($1, $2, $3, GREATEST(clock_timestamp(), (SELECT MAX(created_at) FROM product_info)))";

type ProductRow = (i64, String, Option<String>, Option<String>, DateTime<Utc>);

/// PostgreSQL storage backend
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connects to the server named by `url`
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresStorage)` - Connection established
    /// * `Err(StorageError::Connection)` - Server unreachable or login refused
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn row_to_record((id, title, image_url, price, created_at): ProductRow) -> ProductRecord {
    ProductRecord {
        id,
        title,
        price,
        image_url,
        created_at,
    }
}

#[async_trait]
impl ProductStore for PostgresStorage {
    async fn init_schema(&self) -> StorageResult<()> {
        sqlx::raw_sql(POSTGRES_SCHEMA_SQL)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_batch(&self, products: &[NewProduct]) -> StorageResult<u64> {
        validate_batch(products)?;

        if products.is_empty() {
            return Ok(0);
        }

        // Rolled back on drop unless committed
        let mut tx = self.pool.begin().await?;
        for product in products {
            sqlx::query(INSERT_SQL)
                .bind(&product.title)
                .bind(&product.image_url)
                .bind(&product.price)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!("Batch inserted {} products", products.len());
        Ok(products.len() as u64)
    }

    async fn query(&self, limit: u32) -> StorageResult<Vec<ProductRecord>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, title, image_url, price, created_at FROM product_info
             ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn count(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_info")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn clear_all(&self) -> StorageResult<u64> {
        let removed = sqlx::query("DELETE FROM product_info")
            .execute(&self.pool)
            .await?
            .rows_affected();
        tracing::info!("Cleared {} products from database", removed);
        Ok(removed)
    }
}
