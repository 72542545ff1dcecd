//! Backend-owned order types, read by this core only after creation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::OrderId;

/// Order status values the backend reports.
///
/// The checkout core only ever *writes* `Processing` or `Pending`; the rest
/// show up when reading an order back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    Trash,
}

impl OrderStatus {
    /// Wire value as the backend spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Trash => "trash",
        }
    }
}

/// A created order as the backend returns it.
///
/// Only the fields checkout displays or reconciles against; the backend
/// sends far more, which serde ignores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Customer-facing order number (may differ from the id).
    pub number: String,
    pub status: OrderStatus,
    /// Grand total as the backend's decimal string.
    pub total: String,
    #[serde(default)]
    pub payment_method_title: String,
    #[serde(default)]
    pub transaction_id: String,
}

impl Order {
    /// Grand total as a `Decimal`, zero if the backend sent garbage.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.total.trim().parse().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(OrderStatus::Processing.as_str(), "processing");
        assert_eq!(OrderStatus::OnHold.as_str(), "on-hold");
        assert_eq!(
            serde_json::to_string(&OrderStatus::OnHold).unwrap(),
            "\"on-hold\""
        );
    }

    #[test]
    fn test_order_ignores_extra_fields() {
        let json = r#"{
            "id": 812,
            "number": "812",
            "status": "processing",
            "total": "220.00",
            "payment_method_title": "UPI",
            "transaction_id": "pay_123",
            "currency": "INR",
            "line_items": []
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, OrderId::new(812));
        assert_eq!(order.total_amount(), "220.00".parse().unwrap());
    }
}
