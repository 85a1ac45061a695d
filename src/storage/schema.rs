//! Database schema definitions
//!
//! One table, `product_info`, with an autoincrement key and an insert timestamp.
//! The schema is written once per dialect.

/// SQLite schema
///
/// `created_at` holds a fixed-width RFC 3339 UTC timestamp so that text
/// ordering matches time ordering.
pub const SQLITE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS product_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(500) NOT NULL,
    image_url TEXT,
    price VARCHAR(100),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_product_info_created ON product_info(created_at);
"#;

/// PostgreSQL schema
///
/// `clock_timestamp()` rather than `now()` so rows of one transaction still
/// get increasing timestamps.
pub const POSTGRES_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS product_info (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(500) NOT NULL,
    image_url TEXT,
    price VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
);

CREATE INDEX IF NOT EXISTS idx_product_info_created ON product_info(created_at);
"#;

/// Initializes the SQLite schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SQLITE_SCHEMA_SQL)?;
    Ok(())
}
