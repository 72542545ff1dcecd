//! Local cart inspection and editing.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! saffron cart show
//!
//! # Add two units of product 42 (fetched from the store)
//! saffron cart add -p 42 -q 2
//! ```
//!
//! The cart file lives wherever `SAFFRON_STORAGE_PATH` points; the same
//! snapshot the mobile client persists. Adding a product fetches its name
//! and price from the store first, which needs the API credentials set.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use saffron_checkout::CheckoutConfig;
use saffron_checkout::backend::{BackendError, CommerceBackend, WooClient};
use saffron_checkout::cart::CartStore;
use saffron_checkout::cart::storage::{JsonFileStore, StorageError};
use saffron_checkout::config::ConfigError;

use saffron_core::ProductId;

/// Errors that can occur while working with the local cart.
#[derive(Debug, Error)]
pub enum CartCmdError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store could not be reached or rejected the request.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The cart file could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

async fn open_cart(config: &CheckoutConfig) -> CartStore {
    let storage = Arc::new(JsonFileStore::new(config.storage_path.clone()));
    CartStore::load(storage).await
}

/// Print the cart contents and totals.
#[allow(clippy::print_stdout)]
pub async fn show() -> Result<(), CartCmdError> {
    let config = CheckoutConfig::from_env()?;
    let cart = open_cart(&config).await;
    let state = cart.snapshot();

    if state.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }

    for item in &state.items {
        println!(
            "{:>6}  {:<40} x{:<4} @ {}",
            item.product.id, item.product.name, item.quantity, item.product.price
        );
    }
    println!("Items: {}  Total: {}", state.total_items, state.total_price);
    Ok(())
}

/// Fetch a product from the store and add it to the cart.
#[allow(clippy::print_stdout)]
pub async fn add(product_id: i64, quantity: u32) -> Result<(), CartCmdError> {
    let config = CheckoutConfig::from_env()?;
    let client = WooClient::new(&config)?;
    let product = client.get_product(ProductId::new(product_id)).await?;

    let cart = open_cart(&config).await;
    cart.add_item(product.to_ref(), quantity);
    cart.flush().await?;

    info!(product = %product.name, quantity, "added to cart");
    println!("Added {} x{}", product.name, quantity);
    Ok(())
}

/// Remove a product from the cart.
#[allow(clippy::print_stdout)]
pub async fn remove(product_id: i64) -> Result<(), CartCmdError> {
    let config = CheckoutConfig::from_env()?;
    let cart = open_cart(&config).await;
    cart.remove_item(ProductId::new(product_id));
    cart.flush().await?;

    println!("Removed product {product_id}");
    Ok(())
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub async fn clear() -> Result<(), CartCmdError> {
    let config = CheckoutConfig::from_env()?;
    let cart = open_cart(&config).await;
    cart.clear();
    cart.flush().await?;

    println!("Cart cleared");
    Ok(())
}
