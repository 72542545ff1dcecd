//! Wire shape of a WooCommerce order creation request.
//!
//! These structs serialize to exactly what `POST /orders` expects. They are
//! built once per submission by [`crate::order::OrderSubmitter`] and never
//! mutated afterwards.

use serde::Serialize;

use saffron_core::{Address, OrderStatus, ProductId};

/// One cart line in the order body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price as a decimal string.
    pub price: String,
}

/// A shipping charge on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingLine {
    pub method_id: String,
    pub method_title: String,
    pub total: String,
}

impl ShippingLine {
    /// The store ships everything for free.
    #[must_use]
    pub fn free() -> Self {
        Self {
            method_id: "free_shipping".into(),
            method_title: "Free Shipping".into(),
            total: "0.00".into(),
        }
    }
}

/// One `meta_data` key/value entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: String,
}

impl MetaEntry {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The full order creation body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPayload {
    pub status: OrderStatus,
    pub currency: String,
    /// Backend customer id, `0` for guest checkout.
    pub customer_id: i64,
    /// Gateway id, e.g. `upi` or `bacs`.
    pub payment_method: String,
    pub payment_method_title: String,
    pub set_paid: bool,
    /// Gateway transaction id, empty when the rail produced none.
    pub transaction_id: String,
    pub billing: Address,
    pub shipping: Address,
    pub line_items: Vec<LineItem>,
    pub shipping_lines: Vec<ShippingLine>,
    /// Always empty; the app has no fee support.
    pub fee_lines: Vec<serde_json::Value>,
    /// Always empty; coupons are redeemed on the web storefront only.
    pub coupon_lines: Vec<serde_json::Value>,
    pub customer_note: String,
    pub meta_data: Vec<MetaEntry>,
}

impl OrderPayload {
    /// Look up a `meta_data` value by key.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta_data
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}
