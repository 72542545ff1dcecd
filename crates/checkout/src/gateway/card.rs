//! Native card-gateway adapter.
//!
//! The card rail is a vendor SDK linked into some builds of the host app
//! and absent from others. The SDK sits behind [`CardCheckoutSdk`]; when
//! no implementation is present the adapter resolves unavailable without
//! attempting an invocation, steering the user to UPI.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::debug;

use saffron_core::ExternalRef;

use super::{GatewayOutcome, PaymentRequest};

/// Failure reported by the native SDK (user abort, declined card, ...).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CardSdkError(pub String);

/// What the SDK hands back on success.
#[derive(Debug, Clone)]
pub struct CardSdkResponse {
    pub payment_id: String,
    pub order_id: Option<String>,
    pub signature: Option<String>,
}

/// Invocation parameters for the SDK's checkout sheet.
#[derive(Debug, Clone)]
pub struct CardCheckoutRequest {
    /// Amount in minor units (paise for INR).
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub prefill_name: String,
    pub prefill_email: String,
    pub prefill_phone: String,
}

/// The native checkout SDK boundary.
#[async_trait]
pub trait CardCheckoutSdk: Send + Sync {
    /// Open the checkout sheet and block until it resolves.
    async fn open(&self, request: CardCheckoutRequest) -> Result<CardSdkResponse, CardSdkError>;
}

/// Adapter for the native card-gateway rail.
pub struct CardGatewayAdapter {
    sdk: Option<Arc<dyn CardCheckoutSdk>>,
}

impl CardGatewayAdapter {
    /// Adapter over an SDK implementation, or over none when this build
    /// does not link the vendor SDK.
    #[must_use]
    pub fn new(sdk: Option<Arc<dyn CardCheckoutSdk>>) -> Self {
        Self { sdk }
    }

    /// Drive the SDK to a normalized outcome.
    pub async fn initiate(&self, request: &PaymentRequest) -> GatewayOutcome {
        let Some(sdk) = &self.sdk else {
            return GatewayOutcome::Unavailable {
                message: "card payments are not available in this build; please use UPI instead"
                    .to_string(),
            };
        };

        let sdk_request = CardCheckoutRequest {
            amount_minor: to_minor_units(request.amount),
            currency: request.currency.clone(),
            description: request.note.clone(),
            prefill_name: request.contact.name.clone(),
            prefill_email: request.contact.email.clone(),
            prefill_phone: request.contact.phone.clone(),
        };

        match sdk.open(sdk_request).await {
            Ok(response) => {
                debug!(payment_id = %response.payment_id, "card gateway approved");
                GatewayOutcome::Approved {
                    external_ref: Some(ExternalRef {
                        payment_id: response.payment_id,
                        order_id: response.order_id,
                        signature: response.signature,
                    }),
                }
            }
            Err(e) => GatewayOutcome::Declined {
                reason: e.to_string(),
            },
        }
    }
}

/// Convert a major-unit decimal amount to minor units (paise for INR),
/// rounding to the nearest unit.
fn to_minor_units(amount: Decimal) -> i64 {
    (amount * Decimal::from(100)).round().to_i64().unwrap_or(0)
}
