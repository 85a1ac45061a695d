use crate::storage::{DatabaseTarget, StorageResult};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the scraper
///
/// Every key is optional; absent keys take the values from [`Config::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pagination depth used when `--pages` is not given
    pub pages_default: u32,

    /// Upper bound on pages per run; larger requests are clamped
    pub max_pages: u32,

    /// Pause between successive page fetches (seconds)
    pub request_delay_seconds: f64,

    /// Whether the browser renders off-screen
    pub headless: bool,

    /// Connection target, e.g. `sqlite://products.db` or `postgres://user@host/db`
    pub db_url: String,

    /// Default log level
    pub log_level: LogLevel,

    /// Optional file that receives a copy of the log, appended across runs
    pub log_file: Option<PathBuf>,

    /// Site root the search path is appended to
    pub base_url: String,

    /// Bound on page navigation (seconds)
    pub page_timeout_seconds: u64,

    /// Bound on waiting for the product grid to render (seconds)
    pub render_timeout_seconds: u64,

    /// Explicit browser binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_default: 3,
            max_pages: 10,
            request_delay_seconds: 2.0,
            headless: true,
            db_url: "sqlite://products.db".to_string(),
            log_level: LogLevel::Info,
            log_file: None,
            base_url: "https://www.flipkart.com".to_string(),
            page_timeout_seconds: 30,
            render_timeout_seconds: 20,
            chrome_executable: None,
        }
    }
}

impl Config {
    /// The inter-page delay as a [`Duration`]
    ///
    /// Values that validation would reject map to no delay.
    pub fn request_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_delay_seconds).unwrap_or_default()
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_seconds)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_seconds)
    }

    /// The database selected by `db_url`
    pub fn database_target(&self) -> StorageResult<DatabaseTarget> {
        DatabaseTarget::parse(&self.db_url)
    }

    /// Clamps a requested page count to `max_pages`
    pub fn effective_pages(&self, requested: u32) -> u32 {
        requested.max(1).min(self.max_pages.max(1))
    }
}

/// Log levels accepted in the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// The matching `tracing` filter directive
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            _ => Err(format!(
                "invalid log_level '{}', expected one of DEBUG, INFO, WARNING, ERROR",
                value
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}
