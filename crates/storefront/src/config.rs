//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_API_URL` - Base URL of the restaurant backend (catalog, auth, admin)
//!
//! ## Optional
//! - `BACKEND_ORDERS_API_URL` - Base URL for order and contact endpoints
//!   (default: `BACKEND_API_URL`)
//! - `BACKEND_TIMEOUT_SECS` - Per-request timeout for backend calls (default: 15)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: `http://localhost:{port}`)
//! - `CATALOG_CACHE_TTL_SECS` - How long the menu is cached (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
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
    /// Restaurant backend configuration
    pub backend: BackendConfig,
    /// How long a fetched menu stays fresh
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Restaurant backend API configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Catalog, authentication, reservation and admin endpoints
    pub api_url: Url,
    /// Order placement, order lookup and contact endpoints
    pub orders_api_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    /// Configuration with both bases pointing at `api_url` and the default timeout.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            orders_api_url: api_url.clone(),
            api_url,
            timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
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
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = EnvSource(lookup);

        let host = env
            .or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;
        let base_url = env
            .optional("STOREFRONT_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let api_url = env.url("BACKEND_API_URL")?;
        let orders_api_url = match env.optional("BACKEND_ORDERS_API_URL") {
            Some(_) => env.url("BACKEND_ORDERS_API_URL")?,
            None => api_url.clone(),
        };
        let timeout = env.seconds("BACKEND_TIMEOUT_SECS", DEFAULT_BACKEND_TIMEOUT_SECS)?;
        let catalog_cache_ttl = env.seconds("CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_CACHE_TTL_SECS)?;

        Ok(Self {
            host,
            port,
            base_url,
            backend: BackendConfig {
                api_url,
                orders_api_url,
                timeout,
            },
            catalog_cache_ttl,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS (controls secure cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct EnvSource<F>(F);

impl<F: Fn(&str) -> Option<String>> EnvSource<F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a required absolute http(s) URL.
    fn url(&self, key: &str) -> Result<Url, ConfigError> {
        let raw = self.required(key)?;
        let url = Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    fn seconds(&self, key: &str, default: u64) -> Result<Duration, ConfigError> {
        self.optional(key).map_or(Ok(Duration::from_secs(default)), |raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BACKEND_API_URL", "https://api.example.com")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.backend.timeout, Duration::from_secs(15));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.backend.orders_api_url, config.backend.api_url);
        assert!(config.sentry_dsn.is_none());
        assert!(!config.is_https());
    }

    #[test]
    fn test_missing_backend_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "BACKEND_API_URL"));
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let err = load(&[("BACKEND_API_URL", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let err = load(&[("BACKEND_API_URL", "ftp://api.example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_separate_orders_backend() {
        let config = load(&[
            ("BACKEND_API_URL", "https://api.example.com"),
            ("BACKEND_ORDERS_API_URL", "https://orders.example.com/v1"),
            ("BACKEND_TIMEOUT_SECS", "5"),
            ("STOREFRONT_BASE_URL", "https://bistro.example.com"),
        ])
        .unwrap();
        assert_eq!(config.backend.orders_api_url.as_str(), "https://orders.example.com/v1");
        assert_eq!(config.backend.timeout, Duration::from_secs(5));
        assert!(config.is_https());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("BACKEND_API_URL", "https://api.example.com"),
            ("STOREFRONT_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_socket_addr() {
        let config = load(&[
            ("BACKEND_API_URL", "https://api.example.com"),
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
        ])
        .unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }
}
