//! Cache types for backend API reads.

use super::{PaymentGateway, Product};

/// Cache key for backend reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(i64),
    PaymentGateways,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    PaymentGateways(Vec<PaymentGateway>),
}
