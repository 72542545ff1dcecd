//! PayPal web-redirect adapter.
//!
//! This core only constructs the redirect URL from a pre-existing order
//! token and records that the redirect was initiated. Resolving what
//! happened in the browser is the host application's concern.

use url::Url;

use super::{GatewayOutcome, PaymentRequest};

/// PayPal web checkout entry point.
const CHECKOUT_URL: &str = "https://www.paypal.com/checkoutnow";

/// Adapter for the PayPal redirect rail.
#[derive(Debug, Default, Clone, Copy)]
pub struct PaypalAdapter;

impl PaypalAdapter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Build the redirect URL and report the redirect as initiated.
    ///
    /// Declines when no order token was provisioned for this attempt.
    pub fn initiate(&self, request: &PaymentRequest) -> GatewayOutcome {
        let Some(token) = request.paypal_token.as_deref().filter(|t| !t.is_empty()) else {
            return GatewayOutcome::Declined {
                reason: "no PayPal order token for this checkout".to_string(),
            };
        };

        let url = Url::parse_with_params(CHECKOUT_URL, [("token", token)])
            .map_or_else(|_| format!("{CHECKOUT_URL}?token={token}"), String::from);

        GatewayOutcome::RedirectInitiated { url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ContactPrefill;

    fn request(token: Option<&str>) -> PaymentRequest {
        PaymentRequest {
            amount: "99.00".parse().expect("decimal"),
            currency: "INR".into(),
            note: "Order 9".into(),
            contact: ContactPrefill::default(),
            paypal_token: token.map(String::from),
        }
    }

    #[test]
    fn test_redirect_url_carries_token() {
        let outcome = PaypalAdapter::new().initiate(&request(Some("EC-123")));
        assert_eq!(
            outcome,
            GatewayOutcome::RedirectInitiated {
                url: "https://www.paypal.com/checkoutnow?token=EC-123".into()
            }
        );
    }

    #[test]
    fn test_missing_token_declines() {
        assert!(matches!(
            PaypalAdapter::new().initiate(&request(None)),
            GatewayOutcome::Declined { .. }
        ));
        assert!(matches!(
            PaypalAdapter::new().initiate(&request(Some(""))),
            GatewayOutcome::Declined { .. }
        ));
    }
}
