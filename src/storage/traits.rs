//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{NewProduct, ProductRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    #[error("Invalid record at position {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("PostgreSQL error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every call goes to durable storage; implementations keep no cache.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Creates the `product_info` table if it does not exist yet
    async fn init_schema(&self) -> StorageResult<()>;

    /// Inserts all records in a single transaction
    ///
    /// The batch is validated before anything is written; one invalid record
    /// rejects the whole batch with [`StorageError::InvalidRecord`]. A database
    /// failure mid-batch rolls the transaction back, so either every record is
    /// stored or none is.
    ///
    /// # Returns
    ///
    /// The number of records inserted
    async fn insert_batch(&self, products: &[NewProduct]) -> StorageResult<u64>;

    /// Returns up to `limit` records, newest first
    ///
    /// Ordered by `created_at` descending with `id` descending as tie-break.
    async fn query(&self, limit: u32) -> StorageResult<Vec<ProductRecord>>;

    /// Counts stored records
    async fn count(&self) -> StorageResult<u64>;

    /// Deletes every record
    ///
    /// # Returns
    ///
    /// The number of records removed
    async fn clear_all(&self) -> StorageResult<u64>;
}
