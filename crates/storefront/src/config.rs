//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `FARMSTAND_HOST` - Bind address (default: 127.0.0.1)
//! - `FARMSTAND_PORT` - Listen port (default: 3000)
//! - `FARMSTAND_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `FARMSTAND_CHECKOUT_CLOSE_DELAY_MS` - Confirmation auto-close delay (default: 3000)
//! - `FARMSTAND_SIGN_IN_DELAY_MS` - Simulated farmer sign-in latency (default: 1000)
//! - `FARMSTAND_SHOPPER_IDLE_SECS` - Idle time before a shopper's cart is evicted (default: 7 days)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use farmstand_core::checkout::CONFIRMATION_CLOSE_DELAY;
use thiserror::Error;

const DEFAULT_SIGN_IN_DELAY_MS: u64 = 1000;
const DEFAULT_SHOPPER_IDLE_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
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
    /// Checkout and sign-in timing
    pub timing: TimingConfig,
    /// How long an idle shopper's cart is kept in memory
    pub shopper_idle: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Delays the storefront applies on purpose.
#[derive(Debug, Clone, Copy)]
pub struct TimingConfig {
    /// How long the confirmation step stays open before the cart clears
    pub checkout_close_delay: Duration,
    /// Simulated latency of the farmer sign-in
    pub sign_in_delay: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            checkout_close_delay: CONFIRMATION_CLOSE_DELAY,
            sign_in_delay: Duration::from_millis(DEFAULT_SIGN_IN_DELAY_MS),
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            timing: TimingConfig::default(),
            shopper_idle: Duration::from_secs(DEFAULT_SHOPPER_IDLE_SECS),
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
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let host = get_parsed_or("FARMSTAND_HOST", defaults.host)?;
        let port = get_parsed_or("FARMSTAND_PORT", defaults.port)?;
        let base_url = get_env_or_default("FARMSTAND_BASE_URL", &defaults.base_url);

        let timing = TimingConfig {
            checkout_close_delay: get_millis_or(
                "FARMSTAND_CHECKOUT_CLOSE_DELAY_MS",
                defaults.timing.checkout_close_delay,
            )?,
            sign_in_delay: get_millis_or("FARMSTAND_SIGN_IN_DELAY_MS", defaults.timing.sign_in_delay)?,
        };
        let shopper_idle = Duration::from_secs(get_parsed_or(
            "FARMSTAND_SHOPPER_IDLE_SECS",
            DEFAULT_SHOPPER_IDLE_SECS,
        )?);

        Ok(Self {
            host,
            port,
            base_url,
            timing,
            shopper_idle,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_or("SENTRY_SAMPLE_RATE", defaults.sentry_sample_rate)?,
            sentry_traces_sample_rate: get_parsed_or(
                "SENTRY_TRACES_SAMPLE_RATE",
                defaults.sentry_traces_sample_rate,
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn get_parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

/// Parse a millisecond count into a `Duration`.
fn get_millis_or(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        parse_value::<u64>(key, &raw).map(Duration::from_millis)
    })
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.timing.checkout_close_delay, Duration::from_secs(3));
        assert_eq!(config.timing.sign_in_delay, Duration::from_secs(1));
        assert!(!config.is_secure());
    }

    #[test]
    fn test_parse_value_trims() {
        let port: u16 = parse_value("TEST_PORT", " 8080 ").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("TEST_PORT", "eighty").unwrap_err();
        let ConfigError::InvalidEnvVar(key, _) = err;
        assert_eq!(key, "TEST_PORT");
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            ..StorefrontConfig::default()
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = StorefrontConfig {
            base_url: "https://farmstand.example".to_string(),
            ..StorefrontConfig::default()
        };
        assert!(config.is_secure());
    }
}
