use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::io::ErrorKind;
use std::path::Path;

/// Environment variable that replaces `db_url` when set and non-empty
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Loads and parses a configuration file from the given path
///
/// A missing file is not an error: the built-in defaults are used instead.
/// Anything else that goes wrong (unreadable file, invalid TOML, unknown keys,
/// out-of-range values) is reported so the run stops before any scraping.
///
/// `DATABASE_URL` from the process environment overrides `db_url`, so
/// credentials can stay out of the file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use product_scraper::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Default pages: {}", config.pages_default);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], reading environment overrides through `env`
pub fn load_config_with_env<F>(path: &Path, env: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    apply_env_overrides(&mut config, env);
    validate(&config)?;
    Ok(config)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(db_url) = env(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("db_url taken from {}", DATABASE_URL_ENV);
        config.db_url = db_url;
    }
}
