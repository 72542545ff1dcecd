//! Manual fallback payment (direct bank transfer).
//!
//! There is no external step to perform: the shopper pays after the fact,
//! so the adapter resolves immediately and the order is submitted as paid
//! (the gateway mapping sets `set_paid`), to be reconciled by the merchant
//! against the actual bank transfer.

use crate::gateway::GatewayOutcome;

/// Adapter for the manual "pay later" path. Always succeeds locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualAdapter;

impl ManualAdapter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve the payment step. Manual transfers carry no external
    /// reference; settlement happens out of band.
    #[must_use]
    pub fn initiate(&self) -> GatewayOutcome {
        GatewayOutcome::Approved { external_ref: None }
    }
}
