//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SAFFRON_STORE_URL` - Base URL of the WooCommerce store
//! - `SAFFRON_CONSUMER_KEY` - REST API consumer key
//! - `SAFFRON_CONSUMER_SECRET` - REST API consumer secret
//! - `SAFFRON_UPI_PAYEE_ID` - Merchant UPI id (e.g. merchant@bank)
//!
//! ## Optional
//! - `SAFFRON_MERCHANT_NAME` - Payee label on UPI links (default: Saffron Cart)
//! - `SAFFRON_CURRENCY` - Settlement currency code (default: INR)
//! - `SAFFRON_TAX_RATE` - Decimal tax rate (default: 0.10)
//! - `SAFFRON_HTTP_TIMEOUT_SECS` - Backend request timeout (default: 30)
//! - `SAFFRON_RETRY_ATTEMPTS` - GET retry cap (default: 3)
//! - `SAFFRON_RETRY_BASE_DELAY_MS` - First backoff delay (default: 1000)
//! - `SAFFRON_UPI_MIN_BACKGROUND_MS` - Below this, UPI resolves cancelled (default: 5000)
//! - `SAFFRON_UPI_WAIT_TIMEOUT_SECS` - UPI foreground-return ceiling (default: 300)
//! - `SAFFRON_STORAGE_PATH` - Local snapshot file (default: saffron-store.json)

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

/// Version string stamped into order metadata.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Checkout core configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Base URL of the commerce backend, without the REST path.
    pub store_url: String,
    /// REST API consumer key.
    pub consumer_key: SecretString,
    /// REST API consumer secret.
    pub consumer_secret: SecretString,
    /// Merchant identity used on UPI deep links.
    pub merchant: MerchantConfig,
    /// Tax rate applied at checkout (0.10 = 10%).
    pub tax_rate: Decimal,
    /// Backend HTTP behavior.
    pub http: HttpConfig,
    /// UPI resolution heuristic thresholds.
    pub upi: UpiHeuristics,
    /// Path of the local key-value snapshot file.
    pub storage_path: PathBuf,
}

/// Merchant identity for payment rails.
#[derive(Debug, Clone)]
pub struct MerchantConfig {
    /// Display name, the `pn` field of a UPI link.
    pub name: String,
    /// UPI payee id, the `pa` field of a UPI link.
    pub upi_payee_id: String,
    /// ISO 4217 settlement currency, fixed per store.
    pub currency: String,
}

/// HTTP timeout and retry knobs for the backend client.
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    pub timeout: Duration,
    /// Attempt cap for GET-style reads. Order creation is never retried.
    pub retry_attempts: u32,
    /// Backoff starts here and doubles per attempt.
    pub retry_base_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
        }
    }
}

/// Thresholds for the UPI app-switch heuristic.
///
/// There is no payment callback on this rail; these values decide how a
/// foreground return is interpreted. They are empirical and cannot be
/// verified without a server-side webhook.
#[derive(Debug, Clone, Copy)]
pub struct UpiHeuristics {
    /// Background stays shorter than this: treated as "returned too quickly
    /// to have paid" and resolved cancelled without a prompt.
    pub min_background: Duration,
    /// No foreground return within this window: resolved failed ("please retry").
    pub wait_timeout: Duration,
}

impl Default for UpiHeuristics {
    fn default() -> Self {
        Self {
            min_background: Duration::from_secs(5),
            wait_timeout: Duration::from_secs(300),
        }
    }
}

impl CheckoutConfig {
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

        let store_url = require("SAFFRON_STORE_URL")?
            .trim_end_matches('/')
            .to_string();
        let consumer_key = SecretString::from(require("SAFFRON_CONSUMER_KEY")?);
        let consumer_secret = SecretString::from(require("SAFFRON_CONSUMER_SECRET")?);

        let merchant = MerchantConfig {
            name: optional("SAFFRON_MERCHANT_NAME").unwrap_or_else(|| "Saffron Cart".to_string()),
            upi_payee_id: require("SAFFRON_UPI_PAYEE_ID")?,
            currency: optional("SAFFRON_CURRENCY").unwrap_or_else(|| "INR".to_string()),
        };

        let tax_rate = parse_optional("SAFFRON_TAX_RATE")?
            .unwrap_or_else(|| Decimal::new(10, 2));

        let defaults = HttpConfig::default();
        let http = HttpConfig {
            timeout: parse_optional("SAFFRON_HTTP_TIMEOUT_SECS")?
                .map_or(defaults.timeout, Duration::from_secs),
            retry_attempts: parse_optional("SAFFRON_RETRY_ATTEMPTS")?
                .unwrap_or(defaults.retry_attempts),
            retry_base_delay: parse_optional("SAFFRON_RETRY_BASE_DELAY_MS")?
                .map_or(defaults.retry_base_delay, Duration::from_millis),
        };

        let upi_defaults = UpiHeuristics::default();
        let upi = UpiHeuristics {
            min_background: parse_optional("SAFFRON_UPI_MIN_BACKGROUND_MS")?
                .map_or(upi_defaults.min_background, Duration::from_millis),
            wait_timeout: parse_optional("SAFFRON_UPI_WAIT_TIMEOUT_SECS")?
                .map_or(upi_defaults.wait_timeout, Duration::from_secs),
        };

        let storage_path = optional("SAFFRON_STORAGE_PATH")
            .map_or_else(|| PathBuf::from("saffron-store.json"), PathBuf::from);

        Ok(Self {
            store_url,
            consumer_key,
            consumer_secret,
            merchant,
            tax_rate,
            http,
            upi,
            storage_path,
        })
    }

    /// Fixed configuration for tests; never reads the environment.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            store_url: "https://store.example".to_string(),
            consumer_key: SecretString::from("ck_test".to_string()),
            consumer_secret: SecretString::from("cs_test".to_string()),
            merchant: MerchantConfig {
                name: "Saffron Cart".to_string(),
                upi_payee_id: "merchant@bank".to_string(),
                currency: "INR".to_string(),
            },
            tax_rate: Decimal::new(10, 2),
            http: HttpConfig::default(),
            upi: UpiHeuristics::default(),
            storage_path: PathBuf::from("saffron-store.json"),
        }
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_optional<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    optional(name)
        .map(|v| {
            v.parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_defaults() {
        let http = HttpConfig::default();
        assert_eq!(http.timeout, Duration::from_secs(30));
        assert_eq!(http.retry_attempts, 3);
        assert_eq!(http.retry_base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_upi_heuristic_defaults() {
        let upi = UpiHeuristics::default();
        assert_eq!(upi.min_background, Duration::from_secs(5));
        assert_eq!(upi.wait_timeout, Duration::from_secs(300));
    }
}
