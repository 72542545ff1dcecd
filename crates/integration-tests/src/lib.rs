//! Integration tests for Saffron Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p saffron-integration-tests
//! ```
//!
//! Everything external sits behind a trait seam, so the whole checkout
//! flow runs in-process against the fakes in [`fakes`]: a recording
//! commerce backend, a scripted deep-link opener, a scripted confirmation
//! prompt, and a lifecycle source that publishes fabricated timestamps.
//! No store, network, or device is involved.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod fakes;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use saffron_checkout::CheckoutConfig;
use saffron_checkout::cart::CartStore;
use saffron_checkout::cart::storage::MemoryStore;
use saffron_checkout::form::CheckoutForm;
use saffron_checkout::gateway::{ContactPrefill, PaymentRequest};
use saffron_checkout::lifecycle::{AppPhase, LifecycleSource};
use saffron_core::{Address, ProductId, ProductRef};

/// Fixed store configuration: INR, 10% tax, default UPI thresholds.
#[must_use]
pub fn test_config() -> CheckoutConfig {
    CheckoutConfig::for_tests()
}

/// A product reference with the given id and unit price.
#[must_use]
pub fn product(id: i64, price: &str) -> ProductRef {
    ProductRef {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: price.to_string(),
        image: None,
    }
}

/// An in-memory cart preloaded with the given `(id, price, quantity)` lines.
#[must_use]
pub fn cart_with(lines: &[(i64, &str, u32)]) -> CartStore {
    let cart = CartStore::new(Arc::new(MemoryStore::new()));
    for (id, price, quantity) in lines {
        cart.add_item(product(*id, price), *quantity);
    }
    cart
}

/// A checkout form that passes validation.
#[must_use]
pub fn valid_form() -> CheckoutForm {
    CheckoutForm {
        billing: Address {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha@example.com".into(),
            phone: "9876543210".into(),
            address_1: "12 MG Road".into(),
            address_2: String::new(),
            city: "Bengaluru".into(),
            state: "KA".into(),
            postcode: "560001".into(),
            country: "IN".into(),
        },
        shipping: Address::default(),
        same_as_billing: true,
        customer_note: String::new(),
    }
}

/// A payment request for `amount` in the test currency.
#[must_use]
pub fn payment_request(amount: &str) -> PaymentRequest {
    PaymentRequest {
        amount: amount.parse().unwrap_or(Decimal::ZERO),
        currency: "INR".into(),
        note: "Saffron Cart order".into(),
        contact: ContactPrefill::default(),
        paypal_token: None,
    }
}

/// Fabricated wall-clock instant `secs` seconds into the scenario.
#[must_use]
pub fn at(secs: i64) -> DateTime<Utc> {
    // Any fixed epoch works; only differences matter.
    Utc.timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Publish an app switch with `background_secs` of fabricated background
/// time, once a monitor is actually listening.
pub fn publish_return(lifecycle: &LifecycleSource, background_secs: i64) {
    let lifecycle = lifecycle.clone();
    tokio::spawn(async move {
        while lifecycle.subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }
        lifecycle.publish(AppPhase::Background, at(0));
        lifecycle.publish(AppPhase::Foreground, at(background_secs));
    });
}
