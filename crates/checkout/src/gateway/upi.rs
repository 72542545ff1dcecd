//! UPI deep-link adapter.
//!
//! UPI has no payment callback at this layer. The adapter builds the
//! `upi://pay` link, probes whether any installed app can take it, and
//! opens it; everything after that is inferred by the orchestrator from
//! foreground/background timing plus a manual confirmation.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::MerchantConfig;

use super::{GatewayOutcome, PaymentRequest};

/// Error opening a deep link that probed as openable.
#[derive(Debug, Error)]
#[error("failed to open deep link: {0}")]
pub struct DeepLinkError(pub String);

/// Host capability to probe and open deep links into other apps.
#[async_trait]
pub trait DeepLinkOpener: Send + Sync {
    /// Whether any installed app claims this URI scheme.
    async fn can_open(&self, url: &str) -> bool;

    /// Hand control to the target app.
    async fn open(&self, url: &str) -> Result<(), DeepLinkError>;
}

/// Adapter for the UPI deep-link rail.
pub struct UpiAdapter {
    payee_id: String,
    merchant_name: String,
    currency: String,
    opener: Arc<dyn DeepLinkOpener>,
}

impl UpiAdapter {
    #[must_use]
    pub fn new(merchant: &MerchantConfig, opener: Arc<dyn DeepLinkOpener>) -> Self {
        Self {
            payee_id: merchant.upi_payee_id.clone(),
            merchant_name: merchant.name.clone(),
            currency: merchant.currency.clone(),
            opener,
        }
    }

    /// Build the `upi://pay` URI for `request`.
    ///
    /// Only the transaction note is URL-encoded; the other fields are
    /// merchant-controlled values in the link's expected shape.
    #[must_use]
    pub fn build_link(&self, request: &PaymentRequest) -> String {
        format!(
            "upi://pay?pa={}&pn={}&am={}&cu={}&tn={}",
            self.payee_id,
            self.merchant_name,
            request.amount,
            self.currency,
            urlencoding::encode(&request.note),
        )
    }

    /// Probe whether any installed app can take `link`.
    ///
    /// The orchestrator checks this before subscribing the lifecycle
    /// monitor, so a device with no UPI app never starts one.
    pub async fn is_openable(&self, link: &str) -> bool {
        self.opener.can_open(link).await
    }

    /// Probe and open the UPI link.
    ///
    /// Returns `AwaitExternal` once the link is opened - from the caller's
    /// point of view the payment is now in another app's hands. A device
    /// with no UPI app declines immediately and the lifecycle monitor is
    /// never started.
    pub async fn initiate(&self, request: &PaymentRequest) -> GatewayOutcome {
        let link = self.build_link(request);

        if !self.opener.can_open(&link).await {
            return GatewayOutcome::Declined {
                reason: "no UPI app installed on this device".to_string(),
            };
        }

        match self.opener.open(&link).await {
            Ok(()) => {
                debug!(amount = %request.amount, "UPI deep link opened");
                GatewayOutcome::AwaitExternal { deep_link: link }
            }
            Err(e) => GatewayOutcome::Declined {
                reason: format!("failed to open UPI app: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MerchantConfig;

    struct FixedOpener {
        openable: bool,
    }

    #[async_trait]
    impl DeepLinkOpener for FixedOpener {
        async fn can_open(&self, _url: &str) -> bool {
            self.openable
        }

        async fn open(&self, _url: &str) -> Result<(), DeepLinkError> {
            Ok(())
        }
    }

    fn merchant() -> MerchantConfig {
        MerchantConfig {
            name: "Saffron Cart".into(),
            upi_payee_id: "merchant@bank".into(),
            currency: "INR".into(),
        }
    }

    fn request(amount: &str, note: &str) -> PaymentRequest {
        PaymentRequest {
            amount: amount.parse().expect("decimal"),
            currency: "INR".into(),
            note: note.into(),
            contact: super::super::ContactPrefill::default(),
            paypal_token: None,
        }
    }

    #[test]
    fn test_link_format_encodes_only_the_note() {
        let adapter = UpiAdapter::new(&merchant(), Arc::new(FixedOpener { openable: true }));
        let link = adapter.build_link(&request("220.00", "Order #1723"));
        assert_eq!(
            link,
            "upi://pay?pa=merchant@bank&pn=Saffron Cart&am=220.00&cu=INR&tn=Order%20%231723"
        );
    }

    #[tokio::test]
    async fn test_openable_link_awaits_external() {
        let adapter = UpiAdapter::new(&merchant(), Arc::new(FixedOpener { openable: true }));
        let outcome = adapter.initiate(&request("100.00", "Order 1")).await;
        assert!(matches!(outcome, GatewayOutcome::AwaitExternal { .. }));
    }

    #[tokio::test]
    async fn test_no_upi_app_declines() {
        let adapter = UpiAdapter::new(&merchant(), Arc::new(FixedOpener { openable: false }));
        let outcome = adapter.initiate(&request("100.00", "Order 1")).await;
        assert_eq!(
            outcome,
            GatewayOutcome::Declined {
                reason: "no UPI app installed on this device".into()
            }
        );
    }
}
