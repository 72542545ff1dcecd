//! Commerce backend boundary (WooCommerce REST v3).
//!
//! Checkout consumes the backend through the [`CommerceBackend`] trait so
//! the orchestration and submission logic can run against an in-memory
//! fake. The real client is [`WooClient`].
//!
//! # Error classes
//!
//! Backend failures are classified once, here, by how the caller should
//! react: fix the input ([`BackendError::Validation`]), re-authenticate
//! ([`BackendError::Auth`]), resend the identical request
//! ([`BackendError::Network`]), or give up ([`BackendError::Unexpected`]).

mod cache;
mod woo;

pub use woo::WooClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use saffron_core::{Order, OrderId, ProductId, ProductRef};

use crate::order::payload::OrderPayload;

/// Errors from the commerce backend, classified by retry semantics.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Validation-class response (HTTP 400/422). The server message is
    /// surfaced verbatim; the request must be corrected, not repeated.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// Auth-class response (HTTP 401/403). Fatal for the session.
    #[error("authentication error: {message}")]
    Auth { status: u16, message: String },

    /// Transport failure, including timeouts. Retryable by resending the
    /// identical request.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Anything else; raw message surfaced, order left uncreated.
    #[error("backend error ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

impl BackendError {
    /// Classify a non-success HTTP response.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 | 422 => Self::Validation { status, message },
            401 | 403 => Self::Auth { status, message },
            _ => Self::Unexpected { status, message },
        }
    }
}

/// A catalog product, as much of it as checkout needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Decimal price string, e.g. "149.00".
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// One product image.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductImage {
    pub src: String,
}

impl Product {
    /// The cart-sized reference to this product.
    #[must_use]
    pub fn to_ref(&self) -> ProductRef {
        ProductRef {
            id: self.id,
            name: self.name.clone(),
            price: self.price.clone(),
            image: self.images.first().map(|i| i.src.clone()),
        }
    }
}

/// A payment gateway as the backend advertises it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentGateway {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
}

/// The commerce backend as checkout sees it.
///
/// POST-style order creation is never auto-retried; GET-style reads may
/// retry with backoff inside the implementation.
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    /// Create an order. One network attempt per call.
    async fn create_order(&self, payload: &OrderPayload) -> Result<Order, BackendError>;

    /// Read an order back after creation.
    async fn get_order(&self, id: OrderId) -> Result<Order, BackendError>;

    /// Read a single product.
    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError>;

    /// List the payment gateways the store offers.
    async fn list_payment_gateways(&self) -> Result<Vec<PaymentGateway>, BackendError>;
}

/// Built-in gateway list used when the gateways endpoint is unreachable,
/// so checkout can still offer the supported rails.
#[must_use]
pub fn default_payment_gateways() -> Vec<PaymentGateway> {
    vec![
        PaymentGateway {
            id: "upi".into(),
            title: "UPI".into(),
            description: "Pay using any installed UPI app".into(),
            enabled: true,
        },
        PaymentGateway {
            id: "razorpay".into(),
            title: "Card Gateway".into(),
            description: "Credit and debit cards, netbanking, wallets".into(),
            enabled: true,
        },
        PaymentGateway {
            id: "paypal".into(),
            title: "PayPal".into(),
            description: "Pay via PayPal".into(),
            enabled: true,
        },
        PaymentGateway {
            id: "bacs".into(),
            title: "Direct Bank Transfer".into(),
            description: "Pay by bank transfer, reconciled manually".into(),
            enabled: true,
        },
    ]
}
