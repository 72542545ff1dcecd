//! CLI command implementations.

pub mod cart;
pub mod store;
pub mod upi;
