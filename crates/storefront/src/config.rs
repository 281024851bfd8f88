//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CARTWHEEL_HOST` - Bind address (default: 127.0.0.1)
//! - `CARTWHEEL_PORT` - Listen port (default: 3000)
//! - `CARTWHEEL_CONTINUE_SHOPPING_URL` - Where "Continue Shopping" sends the
//!   shopper, an absolute http(s) URL or a path starting with `/` (default: `/`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

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
    /// Navigation target for the "Continue Shopping" control
    pub continue_shopping_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced by Sentry
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            continue_shopping_url: "/".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
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

    /// Load configuration using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = match lookup("CARTWHEEL_HOST") {
            Some(value) => value.parse::<IpAddr>().map_err(|e| {
                ConfigError::InvalidEnvVar("CARTWHEEL_HOST".to_string(), e.to_string())
            })?,
            None => defaults.host,
        };
        let port = match lookup("CARTWHEEL_PORT") {
            Some(value) => value.parse::<u16>().map_err(|e| {
                ConfigError::InvalidEnvVar("CARTWHEEL_PORT".to_string(), e.to_string())
            })?,
            None => defaults.port,
        };
        let continue_shopping_url = match lookup("CARTWHEEL_CONTINUE_SHOPPING_URL") {
            Some(value) => validate_navigation_target(&value, "CARTWHEEL_CONTINUE_SHOPPING_URL")?,
            None => defaults.continue_shopping_url,
        };
        let sentry_sample_rate = match lookup("SENTRY_SAMPLE_RATE") {
            Some(value) => parse_sample_rate(&value, "SENTRY_SAMPLE_RATE")?,
            None => defaults.sentry_sample_rate,
        };
        let sentry_traces_sample_rate = match lookup("SENTRY_TRACES_SAMPLE_RATE") {
            Some(value) => parse_sample_rate(&value, "SENTRY_TRACES_SAMPLE_RATE")?,
            None => defaults.sentry_traces_sample_rate,
        };

        Ok(Self {
            host,
            port,
            continue_shopping_url,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Accept a site-relative path or an absolute http(s) URL.
fn validate_navigation_target(value: &str, var_name: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingEnvVar(var_name.to_string()));
    }
    // "//host" is protocol-relative, not a path
    if value.starts_with('/') && !value.starts_with("//") {
        return Ok(value.to_string());
    }

    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.to_string())
}

fn parse_sample_rate(value: &str, var_name: &str) -> Result<f32, ConfigError> {
    let rate = value
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.continue_shopping_url, "/");
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_host_and_port() {
        let config = load(&[("CARTWHEEL_HOST", "0.0.0.0"), ("CARTWHEEL_PORT", "8080")]).unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("CARTWHEEL_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(name, _) if name == "CARTWHEEL_PORT"));
    }

    #[test]
    fn test_continue_shopping_path() {
        let config = load(&[("CARTWHEEL_CONTINUE_SHOPPING_URL", "/plants")]).unwrap();
        assert_eq!(config.continue_shopping_url, "/plants");
    }

    #[test]
    fn test_continue_shopping_absolute_url() {
        let config = load(&[(
            "CARTWHEEL_CONTINUE_SHOPPING_URL",
            "https://shop.example.com/catalog",
        )])
        .unwrap();
        assert_eq!(
            config.continue_shopping_url,
            "https://shop.example.com/catalog"
        );
    }

    #[test]
    fn test_continue_shopping_rejects_other_schemes() {
        assert!(load(&[("CARTWHEEL_CONTINUE_SHOPPING_URL", "javascript:alert(1)")]).is_err());
        assert!(load(&[("CARTWHEEL_CONTINUE_SHOPPING_URL", "//evil.example")]).is_err());
        assert!(load(&[("CARTWHEEL_CONTINUE_SHOPPING_URL", "   ")]).is_err());
    }

    #[test]
    fn test_sample_rate_bounds() {
        let config = load(&[("SENTRY_TRACES_SAMPLE_RATE", "0.25")]).unwrap();
        assert!((config.sentry_traces_sample_rate - 0.25).abs() < f32::EPSILON);

        assert!(load(&[("SENTRY_SAMPLE_RATE", "1.5")]).is_err());
        assert!(load(&[("SENTRY_SAMPLE_RATE", "often")]).is_err());
    }

    #[test]
    fn test_empty_sentry_dsn_is_disabled() {
        let config = load(&[("SENTRY_DSN", "")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
