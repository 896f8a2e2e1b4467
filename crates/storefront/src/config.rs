//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `STOREFRONT_CART_STORE` - Cart store backend, `memory` or `file` (default: memory)
//! - `STOREFRONT_CART_DIR` - Directory for the `file` cart store (default: data/carts)
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the catalog
//!   (falls back to `DATABASE_URL`)
//! - `STOREFRONT_CATALOG_FILE` - JSON product file, used when no database is set
//! - `STOREFRONT_CONTENT_DIR` - Markdown content root (default: crates/storefront/content)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which durable store backs carts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartStoreKind {
    /// Process memory; carts are lost on restart.
    Memory,
    /// One JSON file per cart under a directory.
    File(PathBuf),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Cart store backend
    pub cart_store: CartStoreKind,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Product JSON file for the in-memory catalog
    pub catalog_file: Option<PathBuf>,
    /// Root of the markdown content tree
    pub content_dir: PathBuf,
    /// Sentry error tracking settings
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is off when unset
    pub dsn: Option<String>,
    /// Environment tag (e.g. "production")
    pub environment: Option<String>,
    /// Fraction of errors to send
    pub sample_rate: f32,
    /// Fraction of transactions to trace
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = parse_var::<IpAddr>("STOREFRONT_HOST", &get_or("STOREFRONT_HOST", "127.0.0.1"))?;
        let port = parse_var::<u16>("STOREFRONT_PORT", &get_or("STOREFRONT_PORT", "3000"))?;
        let base_url = get_or("STOREFRONT_BASE_URL", "http://localhost:3000");

        let cart_store = match get_or("STOREFRONT_CART_STORE", "memory").as_str() {
            "memory" => CartStoreKind::Memory,
            "file" => CartStoreKind::File(PathBuf::from(get_or("STOREFRONT_CART_DIR", "data/carts"))),
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STOREFRONT_CART_STORE".to_string(),
                    format!("expected 'memory' or 'file', got '{other}'"),
                ));
            }
        };

        // Fallback to generic DATABASE_URL (set by hosted postgres attach)
        let database_url = lookup("STOREFRONT_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from);

        let sentry = SentryConfig {
            dsn: lookup("SENTRY_DSN"),
            environment: lookup("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate("SENTRY_SAMPLE_RATE", lookup("SENTRY_SAMPLE_RATE"), 1.0)?,
            traces_sample_rate: parse_rate(
                "SENTRY_TRACES_SAMPLE_RATE",
                lookup("SENTRY_TRACES_SAMPLE_RATE"),
                0.0,
            )?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            cart_store,
            database_url,
            catalog_file: lookup("STOREFRONT_CATALOG_FILE").map(PathBuf::from),
            content_dir: PathBuf::from(get_or("STOREFRONT_CONTENT_DIR", "crates/storefront/content")),
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable value, naming the variable on failure.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional sample rate in `0.0..=1.0`.
fn parse_rate(key: &str, value: Option<String>, default: f32) -> Result<f32, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let rate = parse_var::<f32>(key, &value)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.cart_store, CartStoreKind::Memory);
        assert!(config.database_url.is_none());
        assert!(config.sentry.dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_file_cart_store() {
        let config = config_from(&[
            ("STOREFRONT_CART_STORE", "file"),
            ("STOREFRONT_CART_DIR", "/var/lib/threadline/carts"),
        ])
        .unwrap();
        assert_eq!(
            config.cart_store,
            CartStoreKind::File(PathBuf::from("/var/lib/threadline/carts"))
        );
    }

    #[test]
    fn test_unknown_cart_store() {
        let err = config_from(&[("STOREFRONT_CART_STORE", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_CART_STORE"));
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("STOREFRONT_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/catalog")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://localhost/catalog"
        );
    }

    #[test]
    fn test_sample_rate_bounds() {
        assert!(config_from(&[("SENTRY_SAMPLE_RATE", "1.5")]).is_err());
        let config = config_from(&[("SENTRY_TRACES_SAMPLE_RATE", "0.25")]).unwrap();
        assert!((config.sentry.traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = config_from(&[("STOREFRONT_BASE_URL", "https://shop.example.com")]).unwrap();
        assert!(config.is_secure());
    }
}
