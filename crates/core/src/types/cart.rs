//! Cart line items and derived totals.
//!
//! `CartState` owns the two invariants the rest of checkout relies on:
//! at most one line per product id, and totals recomputed on every mutation
//! (never cached stale).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// The slice of a catalog product the cart needs to carry.
///
/// `price` stays in the backend's decimal-string form; values that fail to
/// parse are treated as zero, matching how the order form always behaved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    /// Unit price as a decimal string, e.g. "149.00".
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductRef {
    /// Unit price as a `Decimal`, defaulting to zero on parse failure.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.trim().parse().unwrap_or_default()
    }
}

/// One cart line: a product reference plus a quantity of at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductRef,
    pub quantity: u32,
}

impl CartItem {
    /// Line total: unit price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.unit_price() * Decimal::from(self.quantity)
    }
}

/// The cart: ordered line items plus derived totals.
///
/// Mutations go through the methods below, which recompute `total_items`
/// and `total_price` synchronously. The serialized form is the snapshot
/// persisted to local storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_price: Decimal,
}

impl CartState {
    /// An empty cart with zeroed totals.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add `quantity` of `product`, merging into an existing line for the
    /// same product id. Quantities below 1 are rejected as a no-op.
    pub fn add_item(&mut self, product: ProductRef, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem { product, quantity }),
        }
        self.recompute();
    }

    /// Remove the line for `product_id`. Absent id is a no-op.
    pub fn remove_item(&mut self, product_id: ProductId) {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        if self.items.len() != before {
            self.recompute();
        }
    }

    /// Replace the quantity for `product_id`; zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity = quantity;
            self.recompute();
        }
    }

    /// Empty the cart and zero the totals.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    /// Quantity of `product_id` in the cart, zero if absent.
    #[must_use]
    pub fn item_quantity(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|i| i.product.id == product_id)
            .map_or(0, |i| i.quantity)
    }

    /// Whether the cart holds a line for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|i| i.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn recompute(&mut self) {
        self.total_items = self.items.iter().map(|i| i.quantity).sum();
        self.total_price = self.items.iter().map(CartItem::line_total).sum();
    }
}
