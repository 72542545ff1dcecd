//! In-process fakes for every external seam the checkout flow touches.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use saffron_checkout::backend::{
    BackendError, CommerceBackend, PaymentGateway, Product, default_payment_gateways,
};
use saffron_checkout::gateway::{DeepLinkError, DeepLinkOpener};
use saffron_checkout::order::payload::OrderPayload;
use saffron_checkout::orchestrator::ConfirmationPrompt;
use saffron_core::{Order, OrderId, ProductId};

/// Commerce backend that records every order payload it accepts.
///
/// Created orders echo the client-computed total back, so tests can assert
/// the confirmation total matches what was submitted.
pub struct RecordingBackend {
    payloads: Mutex<Vec<OrderPayload>>,
    reject_with: Mutex<Option<BackendError>>,
    next_order_id: i64,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            payloads: Mutex::new(Vec::new()),
            reject_with: Mutex::new(None),
            next_order_id: 1723,
        }
    }

    /// Make the next `create_order` fail with `error`.
    pub fn reject_next(&self, error: BackendError) {
        *self.reject_with.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(error);
    }

    /// Every payload accepted so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<OrderPayload> {
        self.payloads
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommerceBackend for RecordingBackend {
    async fn create_order(&self, payload: &OrderPayload) -> Result<Order, BackendError> {
        if let Some(error) = self
            .reject_with
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
        {
            return Err(error);
        }
        let mut payloads = self
            .payloads
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        payloads.push(payload.clone());
        Ok(Order {
            id: OrderId::new(self.next_order_id),
            number: self.next_order_id.to_string(),
            status: payload.status,
            total: payload.meta("_app_total").unwrap_or("0.00").to_owned(),
            payment_method_title: payload.payment_method_title.clone(),
            transaction_id: payload.transaction_id.clone(),
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, BackendError> {
        Err(BackendError::Unexpected {
            status: 404,
            message: format!("no such order: {id}"),
        })
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        Err(BackendError::Unexpected {
            status: 404,
            message: format!("no such product: {id}"),
        })
    }

    async fn list_payment_gateways(&self) -> Result<Vec<PaymentGateway>, BackendError> {
        Ok(default_payment_gateways())
    }
}

/// Deep-link opener with a fixed openability answer.
pub struct FixedOpener {
    pub openable: bool,
}

#[async_trait]
impl DeepLinkOpener for FixedOpener {
    async fn can_open(&self, _url: &str) -> bool {
        self.openable
    }

    async fn open(&self, _url: &str) -> Result<(), DeepLinkError> {
        if self.openable {
            Ok(())
        } else {
            Err(DeepLinkError("no handler".into()))
        }
    }
}

/// Confirmation prompt with a scripted answer; records whether it was shown.
pub struct ScriptedPrompt {
    answer: bool,
    asked: AtomicBool,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicBool::new(false),
        }
    }

    /// Whether the prompt was ever shown.
    #[must_use]
    pub fn was_asked(&self) -> bool {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn confirm_payment(&self) -> bool {
        self.asked.store(true, Ordering::SeqCst);
        self.answer
    }
}
