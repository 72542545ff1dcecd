//! Billing and shipping addresses.
//!
//! Field names mirror the commerce backend's order schema so the structs
//! serialize straight into an order payload.

use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};

/// Whether an address is used for billing or shipping.
///
/// Billing requires contact fields (email, phone) that shipping does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Billing,
    Shipping,
}

impl AddressKind {
    /// Lowercase label used in validation messages ("billing" / "shipping").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Shipping => "shipping",
        }
    }
}

/// Errors produced when validating an [`Address`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum AddressError {
    /// A required field is empty.
    #[error("please fill in the {kind} {field}")]
    MissingField {
        /// "billing" or "shipping".
        kind: &'static str,
        /// Human-readable field name, e.g. "first name".
        field: &'static str,
    },
    /// The billing email is not a valid address.
    #[error("please enter a valid email address")]
    InvalidEmail(#[from] EmailError),
}

/// A postal address in the commerce backend's shape.
///
/// All fields are plain strings; [`Address::validate`] enforces the
/// required-field rules the checkout form applies before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

impl Address {
    /// Required fields common to billing and shipping.
    const REQUIRED: &'static [(&'static str, fn(&Self) -> &str)] = &[
        ("first name", |a| &a.first_name),
        ("last name", |a| &a.last_name),
        ("address 1", |a| &a.address_1),
        ("city", |a| &a.city),
        ("state", |a| &a.state),
        ("postcode", |a| &a.postcode),
    ];

    /// Validate required fields for the given use, plus email format for
    /// billing addresses.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, or an email format error.
    pub fn validate(&self, kind: AddressKind) -> Result<(), AddressError> {
        for (field, get) in Self::REQUIRED {
            if get(self).trim().is_empty() {
                return Err(AddressError::MissingField {
                    kind: kind.label(),
                    field,
                });
            }
        }

        if kind == AddressKind::Billing {
            if self.email.trim().is_empty() {
                return Err(AddressError::MissingField {
                    kind: kind.label(),
                    field: "email",
                });
            }
            if self.phone.trim().is_empty() {
                return Err(AddressError::MissingField {
                    kind: kind.label(),
                    field: "phone",
                });
            }
            Email::parse(&self.email)?;
        }

        Ok(())
    }

    /// Copy of this address with billing-only contact fields stripped,
    /// for use as a shipping block when "same as billing" is selected.
    #[must_use]
    pub fn as_shipping(&self) -> Self {
        Self {
            email: String::new(),
            phone: String::new(),
            ..self.clone()
        }
    }
}
