//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SPACEMARKET_API_URL` - Base URL of the products/orders API
//!
//! ## Optional
//! - `SPACEMARKET_DATA_DIR` - Directory for local cart storage (default: .spacemarket)
//! - `SPACEMARKET_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: none)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".spacemarket";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the remote API
    pub api_url: Url,
    /// Directory holding local key-value storage (the cart)
    pub data_dir: PathBuf,
    /// Optional per-request timeout; `None` leaves the transport default
    pub http_timeout: Option<Duration>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(
            "SPACEMARKET_API_URL",
            &var("SPACEMARKET_API_URL")
                .ok_or_else(|| ConfigError::MissingEnvVar("SPACEMARKET_API_URL".to_string()))?,
        )?;

        let data_dir = var("SPACEMARKET_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let http_timeout = var("SPACEMARKET_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| {
                        ConfigError::InvalidEnvVar(
                            "SPACEMARKET_HTTP_TIMEOUT_SECS".to_string(),
                            e.to_string(),
                        )
                    })
            })
            .transpose()?;

        Ok(Self {
            api_url,
            data_dir,
            http_timeout,
        })
    }
}

/// Parse an API base URL, accepting only http(s) URLs that can carry paths.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` naming `key` if the URL is unusable.
pub fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected an http(s) base URL, got {url}"),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            StorefrontConfig::from_vars(lookup(&[("SPACEMARKET_API_URL", "http://localhost:5000")]))
                .unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.data_dir, PathBuf::from(".spacemarket"));
        assert!(config.http_timeout.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = StorefrontConfig::from_vars(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SPACEMARKET_API_URL"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = StorefrontConfig::from_vars(lookup(&[("SPACEMARKET_API_URL", "ftp://x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = StorefrontConfig::from_vars(lookup(&[("SPACEMARKET_API_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_optional_values() {
        let config = StorefrontConfig::from_vars(lookup(&[
            ("SPACEMARKET_API_URL", "https://api.spacemarket.example/v1"),
            ("SPACEMARKET_DATA_DIR", "/tmp/sm"),
            ("SPACEMARKET_HTTP_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/sm"));
        assert_eq!(config.http_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = StorefrontConfig::from_vars(lookup(&[
            ("SPACEMARKET_API_URL", "http://localhost:5000"),
            ("SPACEMARKET_HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SPACEMARKET_HTTP_TIMEOUT_SECS"));
    }
}
