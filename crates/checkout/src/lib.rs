//! Saffron Checkout - cart, payment orchestration, and order submission.
//!
//! This crate is the checkout core of the Saffron Cart storefront client.
//! Screens and navigation live in the host application; everything here is
//! the machinery behind the "place order" button:
//!
//! - [`cart`] - the cart store with derived totals and local persistence
//! - [`lifecycle`] - foreground/background monitoring for the UPI flow
//! - [`gateway`] - one adapter per payment method, each yielding a
//!   normalized [`gateway::GatewayOutcome`]
//! - [`orchestrator`] - the per-attempt state machine that drives a gateway
//!   to a terminal [`saffron_core::PaymentAttempt`]
//! - [`order`] - payload building, submission, and error classification
//! - [`backend`] - the commerce-backend boundary (WooCommerce REST v3)
//!
//! # Design
//!
//! External effects sit behind trait seams (`CommerceBackend`,
//! `KeyValueStore`, `DeepLinkOpener`, `CardCheckoutSdk`,
//! `ConfirmationPrompt`, `LifecycleSource`) so the whole checkout flow runs
//! deterministically under test with in-memory fakes.
//!
//! The governing policy: the cart is cleared only on confirmed order
//! creation, and an order is never marked paid without an explicit gateway
//! success or the user's explicit UPI confirmation. The manual-fallback
//! method is the sole, deliberate exception.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod config;
pub mod error;
pub mod form;
pub mod gateway;
pub mod lifecycle;
pub mod order;
pub mod orchestrator;
pub mod saved_methods;

pub use config::CheckoutConfig;
pub use error::CheckoutError;
