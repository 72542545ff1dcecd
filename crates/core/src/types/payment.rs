//! Payment methods, attempts, and gateway references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The payment methods checkout can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// UPI deep link into an installed payment app.
    Upi,
    /// Native card-checkout SDK (Razorpay-style).
    CardGateway,
    /// Web-redirect PayPal checkout.
    Paypal,
    /// No external step; order reconciled manually later.
    FallbackManual,
}

/// Backend gateway identity for a payment method: the `payment_method` /
/// `payment_method_title` pair plus the gateway's default paid flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayMapping {
    pub id: &'static str,
    pub title: &'static str,
    /// `set_paid` the backend gets when the attempt did not succeed outright.
    pub default_set_paid: bool,
}

impl PaymentMethod {
    /// Map to the backend gateway id/title pair.
    #[must_use]
    pub const fn gateway(self) -> GatewayMapping {
        match self {
            Self::Upi => GatewayMapping {
                id: "upi",
                title: "UPI",
                default_set_paid: false,
            },
            Self::CardGateway => GatewayMapping {
                id: "razorpay",
                title: "Card Gateway",
                default_set_paid: false,
            },
            Self::Paypal => GatewayMapping {
                id: "paypal",
                title: "PayPal",
                default_set_paid: false,
            },
            Self::FallbackManual => GatewayMapping {
                id: "bacs",
                title: "Direct Bank Transfer",
                default_set_paid: true,
            },
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.gateway().title)
    }
}

/// Identifiers handed back by an external gateway on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRef {
    /// Gateway payment/transaction id.
    pub payment_id: String,
    /// Gateway-side order id, when the gateway creates one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Gateway signature over (payment id, order id), when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// State of one payment attempt.
///
/// `Success`, `Failed`, and `Cancelled` are terminal; the orchestrator never
/// moves an attempt out of a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Pending,
    AwaitingExternal,
    Success,
    Failed,
    Cancelled,
}

impl AttemptStatus {
    /// Whether this status is absorbing.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Cancelled)
    }
}

/// One in-progress or completed attempt to pay via a chosen method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    pub id: Uuid,
    pub method: PaymentMethod,
    pub status: AttemptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<ExternalRef>,
    /// Human-readable reason for a failed or cancelled attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PaymentAttempt {
    /// Start a new attempt for `method` in `Pending` status.
    #[must_use]
    pub fn begin(method: PaymentMethod, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            status: AttemptStatus::Pending,
            external_ref: None,
            reason: None,
            started_at,
            completed_at: None,
        }
    }

    /// Whether the attempt ended in success.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.status, AttemptStatus::Success)
    }
}

/// A saved payment method, used only to pre-fill method selection.
///
/// Never authoritative for a payment outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPaymentMethod {
    pub method: PaymentMethod,
    /// Display label, e.g. "Visa ending 4242" or a UPI handle.
    pub label: String,
    #[serde(default)]
    pub is_default: bool,
}
