//! End-to-end checkout flows over in-process fakes.
//!
//! Each test drives the real orchestrator and submitter: cart snapshot and
//! validated form in, gateway adapter invocation, (for UPI) the lifecycle
//! heuristic with fabricated timestamps, then order submission against a
//! recording backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use saffron_core::{AttemptStatus, OrderStatus, PaymentMethod};

use saffron_checkout::CheckoutConfig;
use saffron_checkout::backend::BackendError;
use saffron_checkout::cart::CartStore;
use saffron_checkout::gateway::{CardGatewayAdapter, UpiAdapter};
use saffron_checkout::lifecycle::LifecycleSource;
use saffron_checkout::order::{OrderDraft, OrderSubmitter};
use saffron_checkout::orchestrator::{AttemptResult, PaymentOrchestrator};

use saffron_integration_tests::fakes::{FixedOpener, RecordingBackend, ScriptedPrompt};
use saffron_integration_tests::{cart_with, payment_request, publish_return, test_config, valid_form};

struct Checkout {
    config: CheckoutConfig,
    cart: CartStore,
    backend: Arc<RecordingBackend>,
    lifecycle: LifecycleSource,
    prompt: Arc<ScriptedPrompt>,
    orchestrator: PaymentOrchestrator,
}

impl Checkout {
    fn new(upi_openable: bool, prompt_answer: bool) -> Self {
        let config = test_config();
        let cart = cart_with(&[(1, "100.00", 2)]);
        let backend = Arc::new(RecordingBackend::new());
        let lifecycle = LifecycleSource::new();
        let prompt = Arc::new(ScriptedPrompt::answering(prompt_answer));
        let orchestrator = PaymentOrchestrator::new(
            UpiAdapter::new(&config.merchant, Arc::new(FixedOpener { openable: upi_openable })),
            CardGatewayAdapter::new(None),
            lifecycle.clone(),
            prompt.clone(),
            config.upi,
        );
        Self {
            config,
            cart,
            backend,
            lifecycle,
            prompt,
            orchestrator,
        }
    }

    async fn pay(&mut self, method: PaymentMethod) -> AttemptResult {
        self.orchestrator.select_method(method).unwrap();
        self.orchestrator
            .execute(&self.cart, &valid_form(), &payment_request("220.00"))
            .await
            .unwrap()
    }

    async fn submit(&self, result: AttemptResult) -> Result<saffron_checkout::order::OrderConfirmation, saffron_checkout::CheckoutError> {
        let form = valid_form();
        let draft = OrderDraft {
            cart: self.cart.snapshot(),
            customer_id: None,
            billing: form.billing.clone(),
            shipping: form.effective_shipping(),
            attempt: result.attempt,
            customer_note: form.customer_note,
        };
        let submitter =
            OrderSubmitter::new(self.backend.clone(), self.cart.clone(), &self.config);
        submitter.submit(&draft).await
    }
}

#[tokio::test]
async fn upi_confirmed_checkout_creates_processing_order() {
    let mut checkout = Checkout::new(true, true);
    publish_return(&checkout.lifecycle, 10);

    let result = checkout.pay(PaymentMethod::Upi).await;
    assert_eq!(result.attempt.status, AttemptStatus::Success);
    assert!(checkout.prompt.was_asked());

    let confirmation = checkout.submit(result).await.unwrap();
    assert_eq!(confirmation.total, "220.00");
    assert!(confirmation.paid);
    assert!(checkout.cart.is_empty());

    let submitted = checkout.backend.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].status, OrderStatus::Processing);
    assert_eq!(submitted[0].payment_method, "upi");
    assert!(submitted[0].set_paid);
}

#[tokio::test]
async fn upi_quick_return_cancels_without_prompt_or_order() {
    let mut checkout = Checkout::new(true, true);
    publish_return(&checkout.lifecycle, 3);

    let result = checkout.pay(PaymentMethod::Upi).await;
    assert_eq!(result.attempt.status, AttemptStatus::Cancelled);
    assert!(!checkout.prompt.was_asked());
    // No order was placed and the cart is untouched.
    assert!(checkout.backend.submitted().is_empty());
    assert_eq!(checkout.cart.total_items(), 2);
}

#[tokio::test]
async fn upi_without_an_app_fails_without_a_monitor() {
    let mut checkout = Checkout::new(false, true);

    let result = checkout.pay(PaymentMethod::Upi).await;
    assert_eq!(result.attempt.status, AttemptStatus::Failed);
    assert_eq!(
        result.attempt.reason.as_deref(),
        Some("no UPI app installed on this device")
    );
    assert_eq!(checkout.lifecycle.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn upi_timeout_resolves_failed_with_retry_guidance() {
    let mut checkout = Checkout::new(true, true);
    // Nobody publishes a return; the five-minute ceiling expires.
    let result = checkout.pay(PaymentMethod::Upi).await;
    assert_eq!(result.attempt.status, AttemptStatus::Failed);
    assert!(result.attempt.reason.unwrap().contains("please retry"));
}

#[tokio::test]
async fn manual_fallback_places_a_paid_order() {
    let mut checkout = Checkout::new(true, true);

    let result = checkout.pay(PaymentMethod::FallbackManual).await;
    assert_eq!(result.attempt.status, AttemptStatus::Success);

    let confirmation = checkout.submit(result).await.unwrap();
    assert!(confirmation.paid);
    assert!(confirmation.transaction_id.is_empty());
    assert!(checkout.cart.is_empty());

    let submitted = checkout.backend.submitted();
    assert_eq!(submitted[0].payment_method, "bacs");
    assert_eq!(submitted[0].payment_method_title, "Direct Bank Transfer");
}

#[tokio::test]
async fn card_without_sdk_places_a_pending_unpaid_order() {
    let mut checkout = Checkout::new(true, true);

    let result = checkout.pay(PaymentMethod::CardGateway).await;
    assert_eq!(result.attempt.status, AttemptStatus::Failed);
    assert!(result.attempt.reason.as_deref().unwrap().contains("UPI"));

    // The order is still recorded, pending and unpaid.
    let confirmation = checkout.submit(result).await.unwrap();
    assert!(!confirmation.paid);
    let submitted = checkout.backend.submitted();
    assert_eq!(submitted[0].status, OrderStatus::Pending);
    assert!(!submitted[0].set_paid);
}

#[tokio::test]
async fn backend_validation_error_surfaces_verbatim_and_keeps_cart() {
    let mut checkout = Checkout::new(true, true);
    checkout.backend.reject_next(BackendError::Validation {
        status: 400,
        message: "billing postcode is not valid".into(),
    });
    publish_return(&checkout.lifecycle, 10);

    let result = checkout.pay(PaymentMethod::Upi).await;
    let err = checkout.submit(result).await.unwrap_err();

    assert!(err.to_string().contains("billing postcode is not valid"));
    assert!(!checkout.cart.is_empty());
    assert_eq!(checkout.cart.total_items(), 2);
}

#[tokio::test]
async fn client_totals_ride_along_in_order_metadata() {
    let mut checkout = Checkout::new(true, true);

    let result = checkout.pay(PaymentMethod::FallbackManual).await;
    let confirmation = checkout.submit(result).await.unwrap();

    // 100.00 x 2 at 10% tax: 200.00 subtotal, 20.00 tax, 220.00 total.
    let submitted = checkout.backend.submitted();
    assert_eq!(submitted[0].meta("_app_subtotal"), Some("200.00"));
    assert_eq!(submitted[0].meta("_app_tax"), Some("20.00"));
    assert_eq!(submitted[0].meta("_app_total"), Some("220.00"));
    assert_eq!(confirmation.total, "220.00");
    assert_eq!(submitted[0].meta("_order_source"), Some("mobile_app"));
}
