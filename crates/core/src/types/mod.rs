//! Core types for Saffron Cart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod payment;

pub use address::{Address, AddressError, AddressKind};
pub use cart::{CartItem, CartState, ProductRef};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderStatus};
pub use payment::{
    AttemptStatus, ExternalRef, GatewayMapping, PaymentAttempt, PaymentMethod, SavedPaymentMethod,
};
