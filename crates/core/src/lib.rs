//! Saffron Core - Shared types library.
//!
//! This crate provides common types used across all Saffron Cart components:
//! - `checkout` - Cart, payment orchestration, and order submission
//! - `cli` - Command-line tools for inspecting local state and the backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, addresses, cart and payment types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
