//! Unified checkout error type.
//!
//! Every failure a checkout attempt can surface to the host UI lands here,
//! already classified by how it should be handled: inline correction,
//! retry, or re-authentication.

use thiserror::Error;

use saffron_core::AddressError;

use crate::backend::BackendError;

/// Errors surfaced by the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A precondition failed (empty cart, missing field, no method chosen).
    /// The user edits the form and resubmits; nothing was sent anywhere.
    /// Gateway-side declines are not errors; they land on the attempt as
    /// its terminal status and reason.
    #[error("{0}")]
    Validation(String),

    /// The checkout state machine was driven out of order (e.g. executing
    /// before a method was selected, or after a terminal outcome).
    #[error("invalid checkout state: {0}")]
    InvalidState(&'static str),

    /// Order submission failed; see [`BackendError`] for the retry class.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<AddressError> for CheckoutError {
    fn from(err: AddressError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl CheckoutError {
    /// Whether resubmitting the identical request is a reasonable reaction.
    ///
    /// Only transport-class backend failures qualify; everything else needs
    /// user input or a different method first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(BackendError::Network(_)))
    }
}
