//! Checkout form state: addresses, the same-as-billing switch, and the
//! read-only customer snapshot used to pre-fill them.

use serde::{Deserialize, Serialize};

use saffron_core::{Address, AddressKind, CustomerId};

use crate::error::CheckoutError;

/// Read-only snapshot of the authenticated customer, taken when checkout
/// opens. Checkout never reaches back into auth state after this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    /// Backend customer id; `None` for guest checkout.
    pub id: Option<CustomerId>,
    pub billing: Address,
    pub shipping: Address,
}

impl CustomerSnapshot {
    /// A guest with empty addresses.
    #[must_use]
    pub fn guest() -> Self {
        Self::default()
    }
}

/// The address portion of the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub billing: Address,
    pub shipping: Address,
    /// When set, the shipping block mirrors billing and is not validated
    /// separately.
    pub same_as_billing: bool,
    pub customer_note: String,
}

impl CheckoutForm {
    /// Pre-fill from the customer snapshot. Shipping fields fall back to
    /// billing where the profile has no shipping address on file.
    #[must_use]
    pub fn prefilled(customer: &CustomerSnapshot) -> Self {
        let billing = customer.billing.clone();
        let shipping = if customer.shipping.address_1.trim().is_empty() {
            billing.as_shipping()
        } else {
            customer.shipping.clone()
        };
        Self {
            billing,
            shipping,
            same_as_billing: true,
            customer_note: String::new(),
        }
    }

    /// The shipping block that will actually be submitted.
    #[must_use]
    pub fn effective_shipping(&self) -> Address {
        if self.same_as_billing {
            self.billing.as_shipping()
        } else {
            self.shipping.clone()
        }
    }

    /// Validate required fields and email format.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] naming the first offending
    /// field, billing first.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        self.billing.validate(AddressKind::Billing)?;
        if !self.same_as_billing {
            self.shipping.validate(AddressKind::Shipping)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billing() -> Address {
        Address {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha@example.com".into(),
            phone: "9876500000".into(),
            address_1: "12 MG Road".into(),
            address_2: String::new(),
            city: "Bengaluru".into(),
            state: "KA".into(),
            postcode: "560001".into(),
            country: "IN".into(),
        }
    }

    #[test]
    fn test_same_as_billing_skips_shipping_validation() {
        let form = CheckoutForm {
            billing: billing(),
            shipping: Address::default(),
            same_as_billing: true,
            customer_note: String::new(),
        };
        assert!(form.validate().is_ok());
        assert_eq!(form.effective_shipping().city, "Bengaluru");
        assert!(form.effective_shipping().email.is_empty());
    }

    #[test]
    fn test_separate_shipping_is_validated() {
        let form = CheckoutForm {
            billing: billing(),
            shipping: Address::default(),
            same_as_billing: false,
            customer_note: String::new(),
        };
        let err = form.validate().unwrap_err();
        assert!(err.to_string().starts_with("please fill in the shipping"));
    }

    #[test]
    fn test_prefill_falls_back_to_billing_for_shipping() {
        let customer = CustomerSnapshot {
            id: Some(CustomerId::new(4)),
            billing: billing(),
            shipping: Address::default(),
        };
        let form = CheckoutForm::prefilled(&customer);
        assert_eq!(form.shipping.address_1, "12 MG Road");
        assert!(form.shipping.email.is_empty());
    }
}
