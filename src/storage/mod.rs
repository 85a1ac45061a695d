//! Storage module for persisting scraped products
//!
//! This module handles all database operations for the scraper, including:
//! - Schema creation for the `product_info` table
//! - Atomic batch insertion
//! - Newest-first listing, counting and bulk deletion
//!
//! Two backends implement [`ProductStore`]: SQLite (file-based, via rusqlite)
//! and PostgreSQL (client/server, via sqlx). [`open_store`] picks one from the
//! configured `db_url`.

mod postgres;
mod schema;
mod sqlite;
mod traits;

pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use traits::{ProductStore, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Maximum title length accepted by the `product_info` table
pub const MAX_TITLE_LEN: usize = 500;

/// Maximum price length accepted by the `product_info` table
pub const MAX_PRICE_LEN: usize = 100;

/// A product row as stored in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: i64,
    pub title: String,
    pub price: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product ready to be inserted
///
/// `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub price: Option<String>,
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: None,
            image_url: None,
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Checks the record against the column constraints
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is empty".to_string());
        }

        let title_len = self.title.chars().count();
        if title_len > MAX_TITLE_LEN {
            return Err(format!(
                "title is {} characters, limit is {}",
                title_len, MAX_TITLE_LEN
            ));
        }

        if let Some(price) = &self.price {
            let price_len = price.chars().count();
            if price_len > MAX_PRICE_LEN {
                return Err(format!(
                    "price is {} characters, limit is {}",
                    price_len, MAX_PRICE_LEN
                ));
            }
        }

        Ok(())
    }
}

/// Validates every record of a batch, reporting the first offender
pub(crate) fn validate_batch(products: &[NewProduct]) -> StorageResult<()> {
    for (index, product) in products.iter().enumerate() {
        product
            .validate()
            .map_err(|reason| StorageError::InvalidRecord { index, reason })?;
    }
    Ok(())
}

/// Database selected by a `db_url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// SQLite database file
    Sqlite(PathBuf),

    /// Transient in-memory SQLite database
    SqliteMemory,

    /// PostgreSQL connection string
    Postgres(String),
}

impl DatabaseTarget {
    /// Parses a connection URL
    ///
    /// Accepted forms: `sqlite://<path>`, `sqlite::memory:`,
    /// `postgres://…` and `postgresql://…`.
    pub fn parse(db_url: &str) -> StorageResult<Self> {
        let db_url = db_url.trim();

        if db_url == "sqlite::memory:" || db_url == "sqlite://:memory:" {
            return Ok(Self::SqliteMemory);
        }

        if let Some(path) = db_url.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(StorageError::UnsupportedUrl(format!(
                    "'{}' does not name a database file",
                    db_url
                )));
            }
            return Ok(Self::Sqlite(PathBuf::from(path)));
        }

        if db_url.starts_with("postgres://") || db_url.starts_with("postgresql://") {
            return Ok(Self::Postgres(db_url.to_string()));
        }

        Err(StorageError::UnsupportedUrl(format!(
            "'{}' (expected sqlite:// or postgres://)",
            db_url
        )))
    }

    /// Connection description that is safe to log (no credentials)
    pub fn describe(&self) -> String {
        match self {
            Self::Sqlite(path) => format!("sqlite {}", path.display()),
            Self::SqliteMemory => "sqlite (in-memory)".to_string(),
            Self::Postgres(url) => match url::Url::parse(url) {
                Ok(parsed) => format!(
                    "postgres {}{}",
                    parsed.host_str().unwrap_or("localhost"),
                    parsed.path()
                ),
                Err(_) => "postgres".to_string(),
            },
        }
    }
}

/// Opens the store for a target and makes sure the schema exists
///
/// # Returns
///
/// * `Ok(Box<dyn ProductStore>)` - Ready-to-use store
/// * `Err(StorageError)` - Connection or schema creation failed
pub async fn open_store(target: &DatabaseTarget) -> StorageResult<Box<dyn ProductStore>> {
    let store: Box<dyn ProductStore> = match target {
        DatabaseTarget::Sqlite(path) => Box::new(SqliteStorage::new(path)?),
        DatabaseTarget::SqliteMemory => Box::new(SqliteStorage::new_in_memory()?),
        DatabaseTarget::Postgres(url) => Box::new(PostgresStorage::connect(url).await?),
    };

    store.init_schema().await?;
    tracing::debug!("Database ready: {}", target.describe());

    Ok(store)
}
