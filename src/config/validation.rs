use crate::config::types::Config;
use crate::storage::DatabaseTarget;
use crate::{ConfigError, ConfigResult};
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_pagination(config)?;
    validate_delay(config.request_delay_seconds)?;
    validate_timeouts(config)?;
    validate_base_url(&config.base_url)?;
    validate_db_url(&config.db_url)?;
    Ok(())
}

fn validate_pagination(config: &Config) -> ConfigResult<()> {
    if config.pages_default < 1 {
        return Err(ConfigError::Validation(format!(
            "pages_default must be >= 1, got {}",
            config.pages_default
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

fn validate_delay(delay: f64) -> ConfigResult<()> {
    if Duration::try_from_secs_f64(delay).is_err() {
        return Err(ConfigError::Validation(format!(
            "request_delay_seconds must be a non-negative number of seconds within range, got {}",
            delay
        )));
    }
    Ok(())
}

fn validate_timeouts(config: &Config) -> ConfigResult<()> {
    if config.page_timeout_seconds < 1 {
        return Err(ConfigError::Validation(
            "page_timeout_seconds must be >= 1".to_string(),
        ));
    }

    if config.render_timeout_seconds < 1 {
        return Err(ConfigError::Validation(
            "render_timeout_seconds must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// The site root must be an absolute http(s) URL
fn validate_base_url(base_url: &str) -> ConfigResult<()> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    Ok(())
}

fn validate_db_url(db_url: &str) -> ConfigResult<()> {
    if db_url.trim().is_empty() {
        return Err(ConfigError::Validation("db_url cannot be empty".to_string()));
    }

    DatabaseTarget::parse(db_url)
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_delay() {
        assert!(validate_delay(0.0).is_ok());
        assert!(validate_delay(1.5).is_ok());

        assert!(validate_delay(-1.0).is_err());
        assert!(validate_delay(f64::NAN).is_err());
        assert!(validate_delay(f64::INFINITY).is_err());
        assert!(validate_delay(1e20).is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://www.flipkart.com").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080").is_ok());

        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("www.flipkart.com").is_err());
    }

    #[test]
    fn test_validate_db_url() {
        assert!(validate_db_url("sqlite://products.db").is_ok());
        assert!(validate_db_url("sqlite::memory:").is_ok());
        assert!(validate_db_url("postgres://scraper@localhost/products").is_ok());

        assert!(validate_db_url("").is_err());
        assert!(validate_db_url("oracle://db").is_err());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let config = Config {
            render_timeout_seconds: 0,
            ..Config::default()
        };
        assert!(validate(&config).is_err());
    }
}
