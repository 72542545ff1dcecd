//! Turning a finished payment attempt into a backend order.
//!
//! [`OrderSubmitter`] consumes an [`OrderDraft`] (an immutable snapshot of
//! cart, addresses, and the terminal payment attempt), builds the wire
//! payload, posts it once, and clears the cart only after the backend
//! confirms creation. Submission is never retried automatically; a network
//! failure leaves the decision to resubmit with the caller, and there is no
//! client idempotency key, so such a resubmission can duplicate the order.

pub mod payload;

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use saffron_core::{Address, CartState, CustomerId, OrderStatus, PaymentAttempt};

use crate::backend::CommerceBackend;
use crate::cart::CartStore;
use crate::config::{APP_VERSION, CheckoutConfig};
use crate::error::CheckoutError;

use payload::{LineItem, MetaEntry, OrderPayload, ShippingLine};

/// Format a money amount the way the backend spells decimals.
fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Derived money amounts for one checkout, computed client-side for display
/// and recorded on the order as metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CheckoutTotals {
    /// Compute totals from the cart snapshot. Shipping is always free;
    /// tax is a flat rate on the subtotal, rounded to two places.
    #[must_use]
    pub fn compute(cart: &CartState, tax_rate: Decimal) -> Self {
        let subtotal = cart.total_price;
        let shipping = Decimal::ZERO;
        let tax = (subtotal * tax_rate).round_dp(2);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// Immutable snapshot of everything an order submission needs.
///
/// Built from the then-current cart state, not a live reference, so cart
/// edits racing the submission cannot corrupt the in-flight order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub cart: CartState,
    /// `None` for guest checkout.
    pub customer_id: Option<CustomerId>,
    pub billing: Address,
    pub shipping: Address,
    /// The terminal payment attempt this order records.
    pub attempt: PaymentAttempt,
    pub customer_note: String,
}

/// What checkout shows the shopper after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Customer-facing order number.
    pub number: String,
    /// Grand total as the backend reported it.
    pub total: String,
    /// Whether the order was recorded as paid.
    pub paid: bool,
    pub payment_method_title: String,
    pub transaction_id: String,
}

/// Builds and posts the order for a finished checkout.
pub struct OrderSubmitter {
    backend: Arc<dyn CommerceBackend>,
    cart: CartStore,
    currency: String,
    tax_rate: Decimal,
}

impl OrderSubmitter {
    #[must_use]
    pub fn new(backend: Arc<dyn CommerceBackend>, cart: CartStore, config: &CheckoutConfig) -> Self {
        Self {
            backend,
            cart,
            currency: config.merchant.currency.clone(),
            tax_rate: config.tax_rate,
        }
    }

    /// Build the wire payload for `draft`.
    ///
    /// A successful attempt submits the order as `processing` and paid;
    /// anything else submits `pending` with the gateway's own paid default
    /// (manual bank transfer marks itself paid, the external rails do not).
    #[must_use]
    pub fn build_payload(&self, draft: &OrderDraft, totals: &CheckoutTotals) -> OrderPayload {
        let gateway = draft.attempt.method.gateway();
        let success = draft.attempt.succeeded();
        let external = draft.attempt.external_ref.as_ref();
        let transaction_id = external.map(|r| r.payment_id.clone()).unwrap_or_default();

        let mut meta_data = vec![
            MetaEntry::new("_order_source", "mobile_app"),
            MetaEntry::new("_app_version", APP_VERSION),
            MetaEntry::new("_app_subtotal", money(totals.subtotal)),
            MetaEntry::new("_app_tax", money(totals.tax)),
            MetaEntry::new("_app_total", money(totals.total)),
        ];
        if !transaction_id.is_empty() {
            meta_data.push(MetaEntry::new("_transaction_id", transaction_id.clone()));
        }
        if let Some(order_id) = external.and_then(|r| r.order_id.clone()) {
            meta_data.push(MetaEntry::new("_payment_order_id", order_id));
        }
        if let Some(signature) = external.and_then(|r| r.signature.clone()) {
            meta_data.push(MetaEntry::new("_payment_signature", signature));
        }

        OrderPayload {
            status: if success {
                OrderStatus::Processing
            } else {
                OrderStatus::Pending
            },
            currency: self.currency.clone(),
            customer_id: draft.customer_id.map_or(0, |id| id.as_i64()),
            payment_method: gateway.id.into(),
            payment_method_title: gateway.title.into(),
            set_paid: success || gateway.default_set_paid,
            transaction_id,
            billing: draft.billing.clone(),
            shipping: draft.shipping.clone(),
            line_items: draft
                .cart
                .items
                .iter()
                .map(|item| LineItem {
                    product_id: item.product.id,
                    quantity: item.quantity,
                    price: item.product.price.clone(),
                })
                .collect(),
            shipping_lines: vec![ShippingLine::free()],
            fee_lines: vec![],
            coupon_lines: vec![],
            customer_note: draft.customer_note.clone(),
            meta_data,
        }
    }

    /// Post the order. One attempt; the caller decides whether a network
    /// failure warrants resubmitting the identical draft.
    ///
    /// On success the cart is cleared exactly once, after which the draft
    /// should be discarded.
    #[instrument(skip_all, fields(method = %draft.attempt.method))]
    pub async fn submit(&self, draft: &OrderDraft) -> Result<OrderConfirmation, CheckoutError> {
        if draft.cart.is_empty() {
            return Err(CheckoutError::Validation("your cart is empty".into()));
        }

        let totals = CheckoutTotals::compute(&draft.cart, self.tax_rate);
        let body = self.build_payload(draft, &totals);
        let order = self.backend.create_order(&body).await?;

        self.cart.clear();
        info!(number = %order.number, total = %order.total, "order created");

        Ok(OrderConfirmation {
            number: order.number,
            total: order.total,
            paid: body.set_paid,
            payment_method_title: body.payment_method_title,
            transaction_id: body.transaction_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use saffron_core::{
        AttemptStatus, ExternalRef, Order, OrderId, PaymentMethod, ProductId, ProductRef,
    };

    use crate::backend::{BackendError, PaymentGateway, Product, default_payment_gateways};
    use crate::cart::storage::MemoryStore;

    use super::*;

    struct FakeBackend {
        payloads: Mutex<Vec<OrderPayload>>,
        fail_with: Option<fn() -> BackendError>,
    }

    impl FakeBackend {
        fn accepting() -> Self {
            Self {
                payloads: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn rejecting(fail_with: fn() -> BackendError) -> Self {
            Self {
                payloads: Mutex::new(Vec::new()),
                fail_with: Some(fail_with),
            }
        }
    }

    #[async_trait]
    impl CommerceBackend for FakeBackend {
        async fn create_order(&self, body: &OrderPayload) -> Result<Order, BackendError> {
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            self.payloads.lock().unwrap().push(body.clone());
            Ok(Order {
                id: OrderId::new(1723),
                number: "1723".into(),
                status: body.status,
                total: body.meta("_app_total").unwrap_or("0.00").to_owned(),
                payment_method_title: body.payment_method_title.clone(),
                transaction_id: body.transaction_id.clone(),
            })
        }

        async fn get_order(&self, _id: OrderId) -> Result<Order, BackendError> {
            Err(BackendError::Unexpected {
                status: 500,
                message: "not used".into(),
            })
        }

        async fn get_product(&self, _id: ProductId) -> Result<Product, BackendError> {
            Err(BackendError::Unexpected {
                status: 500,
                message: "not used".into(),
            })
        }

        async fn list_payment_gateways(&self) -> Result<Vec<PaymentGateway>, BackendError> {
            Ok(default_payment_gateways())
        }
    }

    fn product(id: i64, price: &str) -> ProductRef {
        ProductRef {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: price.into(),
            image: None,
        }
    }

    fn config() -> CheckoutConfig {
        CheckoutConfig::for_tests()
    }

    fn draft_with(cart: CartState, attempt: PaymentAttempt) -> OrderDraft {
        OrderDraft {
            cart,
            customer_id: None,
            billing: Address::default(),
            shipping: Address::default(),
            attempt,
            customer_note: String::new(),
        }
    }

    fn successful_attempt(method: PaymentMethod, payment_id: &str) -> PaymentAttempt {
        let mut attempt = PaymentAttempt::begin(method, Utc::now());
        attempt.status = AttemptStatus::Success;
        attempt.external_ref = Some(ExternalRef {
            payment_id: payment_id.into(),
            order_id: Some("order_9".into()),
            signature: Some("sig_1".into()),
        });
        attempt.completed_at = Some(Utc::now());
        attempt
    }

    #[test]
    fn totals_apply_flat_tax() {
        let mut cart = CartState::empty();
        cart.add_item(product(1, "100.00"), 2);
        let totals = CheckoutTotals::compute(&cart, Decimal::new(10, 2));
        assert_eq!(money(totals.subtotal), "200.00");
        assert_eq!(money(totals.tax), "20.00");
        assert_eq!(money(totals.total), "220.00");
        assert_eq!(totals.shipping, Decimal::ZERO);
    }

    #[tokio::test]
    async fn successful_attempt_submits_processing_and_paid() {
        let backend = Arc::new(FakeBackend::accepting());
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        cart.add_item(product(1, "100.00"), 2);
        let submitter = OrderSubmitter::new(backend.clone(), cart.clone(), &config());

        let draft = draft_with(cart.snapshot(), successful_attempt(PaymentMethod::Upi, "upi_tx_7"));
        let confirmation = submitter.submit(&draft).await.unwrap();

        assert_eq!(confirmation.number, "1723");
        assert_eq!(confirmation.total, "220.00");
        assert!(confirmation.paid);
        assert_eq!(confirmation.payment_method_title, "UPI");
        assert_eq!(confirmation.transaction_id, "upi_tx_7");
        assert!(cart.is_empty());

        let sent = backend.payloads.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].status, OrderStatus::Processing);
        assert!(sent[0].set_paid);
        assert_eq!(sent[0].payment_method, "upi");
        assert_eq!(sent[0].meta("_order_source"), Some("mobile_app"));
        assert_eq!(sent[0].meta("_transaction_id"), Some("upi_tx_7"));
        assert_eq!(sent[0].meta("_payment_order_id"), Some("order_9"));
        assert_eq!(sent[0].meta("_payment_signature"), Some("sig_1"));
        assert_eq!(sent[0].line_items.len(), 1);
        assert_eq!(sent[0].line_items[0].quantity, 2);
    }

    #[tokio::test]
    async fn manual_fallback_submits_paid_without_external_ref() {
        let backend = Arc::new(FakeBackend::accepting());
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        cart.add_item(product(3, "50.00"), 1);
        let submitter = OrderSubmitter::new(backend.clone(), cart.clone(), &config());

        let mut attempt = PaymentAttempt::begin(PaymentMethod::FallbackManual, Utc::now());
        attempt.status = AttemptStatus::Success;
        attempt.completed_at = Some(Utc::now());
        // Manual transfers succeed locally without an external ref.
        let draft = draft_with(cart.snapshot(), attempt);
        let confirmation = submitter.submit(&draft).await.unwrap();

        assert!(confirmation.paid);
        assert!(confirmation.transaction_id.is_empty());
        let sent = backend.payloads.lock().unwrap();
        assert_eq!(sent[0].payment_method, "bacs");
        assert_eq!(sent[0].meta("_transaction_id"), None);
    }

    #[tokio::test]
    async fn failed_attempt_submits_pending_unpaid() {
        let backend = Arc::new(FakeBackend::accepting());
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        cart.add_item(product(4, "10.00"), 1);
        let submitter = OrderSubmitter::new(backend.clone(), cart.clone(), &config());

        let mut attempt = PaymentAttempt::begin(PaymentMethod::CardGateway, Utc::now());
        attempt.status = AttemptStatus::Failed;
        attempt.reason = Some("declined".into());
        let draft = draft_with(cart.snapshot(), attempt);
        let confirmation = submitter.submit(&draft).await.unwrap();

        assert!(!confirmation.paid);
        let sent = backend.payloads.lock().unwrap();
        assert_eq!(sent[0].status, OrderStatus::Pending);
        assert!(!sent[0].set_paid);
    }

    #[tokio::test]
    async fn validation_error_leaves_cart_untouched() {
        let backend = Arc::new(FakeBackend::rejecting(|| BackendError::Validation {
            status: 400,
            message: "postcode is not valid".into(),
        }));
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        cart.add_item(product(5, "25.00"), 2);
        let submitter = OrderSubmitter::new(backend, cart.clone(), &config());

        let draft = draft_with(cart.snapshot(), successful_attempt(PaymentMethod::Upi, "tx"));
        let err = submitter.submit(&draft).await.unwrap_err();

        assert!(err.to_string().contains("postcode is not valid"));
        assert!(!cart.is_empty());
        assert_eq!(cart.total_items(), 2);
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_before_posting() {
        let backend = Arc::new(FakeBackend::accepting());
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        let submitter = OrderSubmitter::new(backend.clone(), cart.clone(), &config());

        let draft = draft_with(cart.snapshot(), successful_attempt(PaymentMethod::Upi, "tx"));
        let err = submitter.submit(&draft).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(_)));
        assert!(backend.payloads.lock().unwrap().is_empty());
    }
}
