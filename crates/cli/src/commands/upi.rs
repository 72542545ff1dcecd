//! UPI deep-link preview.
//!
//! # Usage
//!
//! ```bash
//! saffron upi-link -a 220.00 -n "Order 1723"
//! ```
//!
//! Prints the `upi://pay` link the mobile client would open for the given
//! amount, using the configured merchant identity. Nothing is opened or
//! charged; this exists to eyeball the link a device would receive.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use saffron_checkout::CheckoutConfig;
use saffron_checkout::config::ConfigError;
use saffron_checkout::gateway::{
    ContactPrefill, DeepLinkError, DeepLinkOpener, PaymentRequest, UpiAdapter,
};

/// Errors that can occur while previewing a UPI link.
#[derive(Debug, Error)]
pub enum UpiCmdError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Opener that never opens anything; link building does not need one.
struct NullOpener;

#[async_trait]
impl DeepLinkOpener for NullOpener {
    async fn can_open(&self, _url: &str) -> bool {
        false
    }

    async fn open(&self, _url: &str) -> Result<(), DeepLinkError> {
        Err(DeepLinkError("not available outside the mobile host".into()))
    }
}

/// Print the UPI deep link for `amount`.
#[allow(clippy::print_stdout)]
pub fn preview(amount: Decimal, note: &str) -> Result<(), UpiCmdError> {
    let config = CheckoutConfig::from_env()?;
    let adapter = UpiAdapter::new(&config.merchant, Arc::new(NullOpener));
    let request = PaymentRequest {
        amount,
        currency: config.merchant.currency.clone(),
        note: note.to_string(),
        contact: ContactPrefill::default(),
        paypal_token: None,
    };
    println!("{}", adapter.build_link(&request));
    Ok(())
}
