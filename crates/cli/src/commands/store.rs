//! Read-only store queries over the WooCommerce REST API.
//!
//! # Usage
//!
//! ```bash
//! saffron gateways
//! saffron product 42
//! saffron order 1723
//! ```
//!
//! # Environment Variables
//!
//! - `SAFFRON_STORE_URL` - Base URL of the WooCommerce store
//! - `SAFFRON_CONSUMER_KEY` / `SAFFRON_CONSUMER_SECRET` - REST credentials

use thiserror::Error;

use saffron_checkout::CheckoutConfig;
use saffron_checkout::backend::{BackendError, CommerceBackend, WooClient};
use saffron_checkout::config::ConfigError;

use saffron_core::{OrderId, ProductId};

/// Errors that can occur during store queries.
#[derive(Debug, Error)]
pub enum StoreCmdError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store could not be reached or rejected the request.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

fn client() -> Result<WooClient, StoreCmdError> {
    Ok(WooClient::new(&CheckoutConfig::from_env()?)?)
}

/// List the store's payment gateways.
#[allow(clippy::print_stdout)]
pub async fn gateways() -> Result<(), StoreCmdError> {
    let gateways = client()?.list_payment_gateways().await?;
    for gateway in gateways {
        let state = if gateway.enabled { "enabled" } else { "disabled" };
        println!("{:<12} {:<24} [{state}]", gateway.id, gateway.title);
    }
    Ok(())
}

/// Fetch and print one product.
#[allow(clippy::print_stdout)]
pub async fn product(id: i64) -> Result<(), StoreCmdError> {
    let product = client()?.get_product(ProductId::new(id)).await?;
    println!("{:>6}  {}  @ {}", product.id, product.name, product.price);
    Ok(())
}

/// Fetch and print one order.
#[allow(clippy::print_stdout)]
pub async fn order(id: i64) -> Result<(), StoreCmdError> {
    let order = client()?.get_order(OrderId::new(id)).await?;
    println!(
        "Order #{}  status: {}  total: {}",
        order.number,
        order.status.as_str(),
        order.total
    );
    if !order.payment_method_title.is_empty() {
        println!("Paid via: {}", order.payment_method_title);
    }
    if !order.transaction_id.is_empty() {
        println!("Transaction: {}", order.transaction_id);
    }
    Ok(())
}
