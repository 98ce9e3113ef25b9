//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SPACEMARKET_API_URL` - Base URL of the products/orders API
//! - `SPACEMARKET_ADMIN_KEY` - Value sent as `x-admin-key` (high entropy, not a placeholder)
//!
//! ## Optional
//! - `SPACEMARKET_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: none)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ADMIN_KEY_LENGTH: usize = 16;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "admin-key",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin client configuration.
///
/// Implements `Debug` manually to redact the admin key.
#[derive(Clone)]
pub struct AdminConfig {
    /// Base URL of the remote API
    pub api_url: Url,
    /// Credential sent with every admin request
    pub admin_key: SecretString,
    /// Optional per-request timeout
    pub http_timeout: Option<Duration>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_url", &self.api_url.as_str())
            .field("admin_key", &"[REDACTED]")
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the admin key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the admin key looks like a placeholder.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = required(&var, "SPACEMARKET_API_URL")?;
        let api_url = Url::parse(raw_url.trim())
            .map_err(|e| ConfigError::InvalidEnvVar("SPACEMARKET_API_URL".to_string(), e.to_string()))?;
        if !matches!(api_url.scheme(), "http" | "https") || api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "SPACEMARKET_API_URL".to_string(),
                "must be an http(s) URL".to_string(),
            ));
        }

        let admin_key = required(&var, "SPACEMARKET_ADMIN_KEY")?;
        validate_admin_key(&admin_key, "SPACEMARKET_ADMIN_KEY")?;

        let http_timeout = var("SPACEMARKET_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "SPACEMARKET_HTTP_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?;

        Ok(Self {
            api_url,
            admin_key: SecretString::from(admin_key),
            http_timeout,
        })
    }

    /// The admin key, for building request headers.
    #[must_use]
    pub fn admin_key(&self) -> &str {
        self.admin_key.expose_secret()
    }
}

fn required(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    var(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Validate length, placeholder patterns and entropy of the admin key.
fn validate_admin_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if key.len() < MIN_ADMIN_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_KEY_LENGTH,
                key.len()
            ),
        ));
    }
    validate_secret_strength(key, var_name)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}
