//! Payment gateway adapters.
//!
//! One adapter per payment method, each producing a [`GatewayOutcome`] -
//! the normalized tagged union the orchestrator consumes. Adapters never
//! touch the cart or the backend; they only talk to their own rail.

pub mod card;
pub mod manual;
pub mod paypal;
pub mod upi;

pub use card::{CardCheckoutSdk, CardGatewayAdapter, CardSdkError, CardSdkResponse};
pub use manual::ManualAdapter;
pub use paypal::PaypalAdapter;
pub use upi::{DeepLinkError, DeepLinkOpener, UpiAdapter};

use rust_decimal::Decimal;

use saffron_core::ExternalRef;

/// What a gateway adapter reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The rail confirmed payment. `external_ref` is `None` only for the
    /// manual fallback, which has no external step.
    Approved { external_ref: Option<ExternalRef> },

    /// The rail rejected or could not start the payment.
    Declined { reason: String },

    /// The rail is not present in this build. Actionable: the message
    /// suggests an alternative method.
    Unavailable { message: String },

    /// Control was handed to an external app; the outcome must be inferred
    /// (UPI). Resolution happens in the orchestrator via the lifecycle
    /// heuristic and manual confirmation.
    AwaitExternal { deep_link: String },

    /// A web redirect was started (PayPal); resolution is delegated to the
    /// host's browser flow and reconciled outside this core.
    RedirectInitiated { url: String },
}

/// Contact fields pre-filled into gateway UIs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPrefill {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Everything an adapter may need to start a payment.
///
/// Built by the orchestrator from the order draft; each adapter reads the
/// fields its rail uses.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// Grand total in the store's settlement currency.
    pub amount: Decimal,
    /// ISO 4217 settlement currency code.
    pub currency: String,
    /// Human-readable transaction note, e.g. "Order 1723".
    pub note: String,
    pub contact: ContactPrefill,
    /// Pre-existing PayPal order token, when that method is in play.
    pub paypal_token: Option<String>,
}
