//! Page sources: where rendered search-result HTML comes from
//!
//! The coordinator only needs "give me the rendered HTML for this URL", which
//! is the [`PageSource`] trait. [`ChromeBrowser`] implements it with a headless
//! Chromium driven over CDP by chromiumoxide.

use crate::config::Config;
use crate::crawler::selectors::RENDER_WAIT_SELECTORS;
use crate::ScraperError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;

/// Interval between checks for the product grid
const RENDER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Pages shorter than this are most likely error or bot-check pages
const MIN_EXPECTED_CONTENT_LEN: usize = 100;

/// Per-page failures; the run continues with the next page
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Navigation to {url} timed out after {seconds}s")]
    NavigationTimeout { url: String, seconds: u64 },

    #[error("Product grid did not render at {url} within {seconds}s")]
    RenderTimeout { url: String, seconds: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
}

/// Source of rendered page HTML
#[async_trait]
pub trait PageSource: Send {
    /// Loads `url`, waits for product content, and returns the page HTML
    async fn fetch_page(&mut self, url: &str) -> Result<String, PageError>;

    /// Releases the underlying resources
    async fn close(&mut self) {}
}

/// Headless Chromium page source
///
/// One browser process with one tab, kept for the whole run. Call
/// `close()` when done; dropping without closing still stops
/// the CDP handler and the child process.
pub struct ChromeBrowser {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    page_timeout: Duration,
    render_timeout: Duration,
    closed: bool,
}

impl ChromeBrowser {
    /// Launches the browser and opens a blank tab
    ///
    /// # Returns
    ///
    /// * `Ok(ChromeBrowser)` - Browser ready to navigate
    /// * `Err(ScraperError::BrowserLaunch)` - Executable missing or failed to start
    pub async fn launch(config: &Config) -> Result<Self, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(config.page_timeout())
            .window_size(1920, 1080)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = find_browser_executable(config) {
            tracing::info!("Using browser executable: {}", executable.display());
            builder = builder.chrome_executable(executable);
        }

        let browser_config = builder.build().map_err(ScraperError::BrowserLaunch)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {}", e);
                }
            }
            tracing::debug!("Browser event handler task completed");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(ScraperError::BrowserLaunch(format!(
                    "failed to open a tab: {}",
                    e
                )));
            }
        };

        tracing::info!(
            "Browser setup completed ({})",
            if config.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            browser,
            page,
            handler,
            page_timeout: config.page_timeout(),
            render_timeout: config.render_timeout(),
            closed: false,
        })
    }
}

#[async_trait]
impl PageSource for ChromeBrowser {
    async fn fetch_page(&mut self, url: &str) -> Result<String, PageError> {
        tracing::info!("Fetching: {}", url);

        let navigation = tokio::time::timeout(self.page_timeout, self.page.goto(url)).await;
        match navigation {
            Ok(Ok(_)) => {}
            Err(_) | Ok(Err(CdpError::Timeout)) => {
                return Err(PageError::NavigationTimeout {
                    url: url.to_string(),
                    seconds: self.page_timeout.as_secs(),
                });
            }
            Ok(Err(e)) => {
                return Err(PageError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        }

        wait_for_products(&self.page, url, self.render_timeout).await?;

        let content = self
            .page
            .content()
            .await
            .map_err(|e| PageError::Navigation {
                url: url.to_string(),
                message: format!("failed to read page content: {}", e),
            })?;

        if content.trim().len() < MIN_EXPECTED_CONTENT_LEN {
            tracing::warn!("Suspiciously short content from {}", url);
        }

        Ok(content)
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Error during browser cleanup: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Error waiting for browser exit: {}", e);
        }
        self.handler.abort();

        tracing::info!("Browser cleanup completed");
    }
}

impl Drop for ChromeBrowser {
    fn drop(&mut self) {
        // Browser's own Drop kills the child process
        self.handler.abort();
        if !self.closed {
            tracing::debug!("ChromeBrowser dropped without close()");
        }
    }
}

/// Polls until any render-wait selector is present
async fn wait_for_products(page: &Page, url: &str, timeout: Duration) -> Result<(), PageError> {
    let start = Instant::now();

    if poll_until(timeout, || render_selector_present(page)).await {
        tracing::debug!("Product grid rendered after {:?}", start.elapsed());
        Ok(())
    } else {
        Err(PageError::RenderTimeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        })
    }
}

async fn render_selector_present(page: &Page) -> bool {
    for selector in RENDER_WAIT_SELECTORS {
        if page.find_element(*selector).await.is_ok() {
            tracing::debug!("Found products using selector {}", selector);
            return true;
        }
    }
    false
}

/// Runs `check` every poll interval until it returns true
///
/// The whole wait, including a check that never completes, is bounded by
/// `timeout`. Returns false when the deadline passes first.
async fn poll_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let polling = async {
        loop {
            if check().await {
                return;
            }
            tokio::time::sleep(RENDER_POLL_INTERVAL).await;
        }
    };

    tokio::time::timeout(timeout, polling).await.is_ok()
}

/// Explicit executable from config, then `CHROMIUM_PATH`
///
/// `None` lets chromiumoxide search the usual install locations.
fn find_browser_executable(config: &Config) -> Option<PathBuf> {
    if let Some(path) = &config.chrome_executable {
        return Some(path.clone());
    }

    let path = PathBuf::from(std::env::var_os("CHROMIUM_PATH")?);
    if path.exists() {
        Some(path)
    } else {
        tracing::warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_executable_takes_precedence() {
        let config = Config {
            chrome_executable: Some(PathBuf::from("/opt/chromium/chrome")),
            ..Config::default()
        };
        assert_eq!(
            find_browser_executable(&config),
            Some(PathBuf::from("/opt/chromium/chrome"))
        );
    }

    #[tokio::test]
    async fn test_poll_until_bounds_a_stalled_check() {
        let start = Instant::now();
        let found = poll_until(Duration::from_millis(100), std::future::pending::<bool>).await;

        assert!(!found);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_poll_until_retries_until_ready() {
        let mut calls = 0;
        let found = poll_until(Duration::from_secs(5), || {
            calls += 1;
            let ready = calls >= 3;
            async move { ready }
        })
        .await;

        assert!(found);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out_when_never_ready() {
        let found = poll_until(Duration::from_millis(300), || async { false }).await;
        assert!(!found);
    }

    #[test]
    fn test_page_error_messages() {
        let err = PageError::NavigationTimeout {
            url: "https://example.com/search?q=x&page=2".to_string(),
            seconds: 30,
        };
        assert_eq!(
            err.to_string(),
            "Navigation to https://example.com/search?q=x&page=2 timed out after 30s"
        );
    }
}
