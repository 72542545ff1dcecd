//! The per-attempt payment state machine.
//!
//! One [`PaymentOrchestrator`] drives exactly one checkout attempt:
//! `Idle -> MethodSelected -> AwaitingExternal (UPI/PayPal only) -> Resolved`,
//! with `Resolved` absorbing. It owns the gateway adapters, applies the UPI
//! app-switch heuristic, and hands back a terminal [`PaymentAttempt`] for
//! [`crate::order::OrderSubmitter`] to consume.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};

use saffron_core::{AttemptStatus, ExternalRef, PaymentAttempt, PaymentMethod};

use crate::cart::CartStore;
use crate::config::UpiHeuristics;
use crate::error::CheckoutError;
use crate::form::CheckoutForm;
use crate::gateway::{
    CardGatewayAdapter, GatewayOutcome, ManualAdapter, PaymentRequest, PaypalAdapter, UpiAdapter,
};
use crate::lifecycle::{AppLifecycleMonitor, LifecycleSource, ReturnOutcome};

/// UI seam for the binary UPI confirmation ("Payment Completed" /
/// "Payment Failed"). The answer is adopted verbatim; nothing verifies it.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask whether the external payment completed. `true` means completed.
    async fn confirm_payment(&self) -> bool;
}

/// Where the attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    MethodSelected(PaymentMethod),
    /// Control is in another app's hands; only the heuristic or the
    /// timeout exits.
    AwaitingExternal(PaymentMethod),
    /// The attempt ended, as far as this core resolves it. For PayPal the
    /// carried status is `AwaitingExternal`: the redirect outcome is
    /// reconciled outside this core.
    Resolved(AttemptStatus),
}

impl CheckoutPhase {
    /// Whether the attempt can no longer be driven.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// What `execute` hands back: the attempt plus, for PayPal, the redirect
/// URL the host must open.
#[derive(Debug, Clone)]
pub struct AttemptResult {
    pub attempt: PaymentAttempt,
    pub redirect_url: Option<String>,
}

/// Drives one payment attempt through the gateway adapters.
pub struct PaymentOrchestrator {
    upi: UpiAdapter,
    card: CardGatewayAdapter,
    paypal: PaypalAdapter,
    manual: ManualAdapter,
    lifecycle: LifecycleSource,
    prompt: Arc<dyn ConfirmationPrompt>,
    heuristics: UpiHeuristics,
    phase: CheckoutPhase,
}

impl PaymentOrchestrator {
    #[must_use]
    pub fn new(
        upi: UpiAdapter,
        card: CardGatewayAdapter,
        lifecycle: LifecycleSource,
        prompt: Arc<dyn ConfirmationPrompt>,
        heuristics: UpiHeuristics,
    ) -> Self {
        Self {
            upi,
            card,
            paypal: PaypalAdapter::new(),
            manual: ManualAdapter::new(),
            lifecycle,
            prompt,
            heuristics,
            phase: CheckoutPhase::Idle,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Choose (or re-choose) the payment method.
    ///
    /// # Errors
    ///
    /// Rejected once a payment is in flight or the attempt has resolved.
    pub fn select_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        match self.phase {
            CheckoutPhase::Idle | CheckoutPhase::MethodSelected(_) => {
                self.phase = CheckoutPhase::MethodSelected(method);
                Ok(())
            }
            CheckoutPhase::AwaitingExternal(_) => {
                Err(CheckoutError::InvalidState("a payment is already in flight"))
            }
            CheckoutPhase::Resolved(_) => {
                Err(CheckoutError::InvalidState("this attempt has already resolved"))
            }
        }
    }

    /// Abandon the attempt before any payment starts.
    ///
    /// # Errors
    ///
    /// Once `AwaitingExternal` is entered there is no way to abort the
    /// external app context; only the heuristic or the timeout exits.
    pub fn cancel(&mut self) -> Result<(), CheckoutError> {
        match self.phase {
            CheckoutPhase::Idle | CheckoutPhase::MethodSelected(_) => {
                self.phase = CheckoutPhase::Resolved(AttemptStatus::Cancelled);
                Ok(())
            }
            CheckoutPhase::AwaitingExternal(_) => {
                Err(CheckoutError::InvalidState("cannot abort an external payment"))
            }
            CheckoutPhase::Resolved(_) => {
                Err(CheckoutError::InvalidState("this attempt has already resolved"))
            }
        }
    }

    /// Run the selected method to a terminal outcome.
    ///
    /// Preconditions checked before anything leaves this process: a method
    /// is selected, the cart is non-empty, and the form validates. A
    /// declined or cancelled payment is not an error; it comes back as the
    /// attempt's terminal status with a reason.
    ///
    /// # Errors
    ///
    /// Precondition failures only; the attempt was not started.
    #[instrument(skip_all, fields(method))]
    pub async fn execute(
        &mut self,
        cart: &CartStore,
        form: &CheckoutForm,
        request: &PaymentRequest,
    ) -> Result<AttemptResult, CheckoutError> {
        let method = match self.phase {
            CheckoutPhase::MethodSelected(method) => method,
            CheckoutPhase::Idle => {
                return Err(CheckoutError::Validation(
                    "please select a payment method".into(),
                ));
            }
            CheckoutPhase::AwaitingExternal(_) => {
                return Err(CheckoutError::InvalidState("a payment is already in flight"));
            }
            CheckoutPhase::Resolved(_) => {
                return Err(CheckoutError::InvalidState("this attempt has already resolved"));
            }
        };
        tracing::Span::current().record("method", tracing::field::display(method));

        if cart.is_empty() {
            return Err(CheckoutError::Validation("your cart is empty".into()));
        }
        form.validate()?;

        let mut attempt = PaymentAttempt::begin(method, Utc::now());
        let mut redirect_url = None;

        match method {
            PaymentMethod::Upi => self.pay_upi(&mut attempt, request).await,
            PaymentMethod::CardGateway => {
                let outcome = self.card.initiate(request).await;
                resolve_direct(&mut attempt, outcome);
            }
            PaymentMethod::Paypal => match self.paypal.initiate(request) {
                GatewayOutcome::RedirectInitiated { url } => {
                    info!(%url, "PayPal redirect initiated");
                    attempt.status = AttemptStatus::AwaitingExternal;
                    redirect_url = Some(url);
                }
                outcome => resolve_direct(&mut attempt, outcome),
            },
            PaymentMethod::FallbackManual => {
                resolve_direct(&mut attempt, self.manual.initiate());
            }
        }

        self.phase = CheckoutPhase::Resolved(attempt.status);
        info!(status = ?attempt.status, "payment attempt resolved");
        Ok(AttemptResult {
            attempt,
            redirect_url,
        })
    }

    /// The UPI rail: open the deep link, then infer the outcome from how
    /// long the app stayed in background plus a manual confirmation.
    async fn pay_upi(&mut self, attempt: &mut PaymentAttempt, request: &PaymentRequest) {
        let link = self.upi.build_link(request);
        if !self.upi.is_openable(&link).await {
            finish(attempt, AttemptStatus::Failed, Some("no UPI app installed on this device".into()));
            return;
        }

        // Subscribe before opening so the background transition that the
        // app switch causes cannot be missed.
        let monitor = AppLifecycleMonitor::subscribe(&self.lifecycle);
        self.phase = CheckoutPhase::AwaitingExternal(PaymentMethod::Upi);
        attempt.status = AttemptStatus::AwaitingExternal;

        match self.upi.initiate(request).await {
            GatewayOutcome::AwaitExternal { .. } => {}
            GatewayOutcome::Declined { reason } => {
                finish(attempt, AttemptStatus::Failed, Some(reason));
                return;
            }
            outcome => {
                warn!(?outcome, "unexpected UPI gateway outcome");
                finish(attempt, AttemptStatus::Failed, Some("UPI payment could not start".into()));
                return;
            }
        }

        match monitor.wait_for_return(self.heuristics.wait_timeout).await {
            ReturnOutcome::TimedOut => {
                finish(
                    attempt,
                    AttemptStatus::Failed,
                    Some("payment was not confirmed in time; please retry".into()),
                );
            }
            outcome @ ReturnOutcome::Returned { .. } => {
                let elapsed = outcome.background_elapsed();
                if elapsed < self.heuristics.min_background {
                    info!(?elapsed, "returned too quickly, treating as cancelled");
                    finish(
                        attempt,
                        AttemptStatus::Cancelled,
                        Some("returned from the UPI app without completing the payment".into()),
                    );
                } else if self.prompt.confirm_payment().await {
                    finish(attempt, AttemptStatus::Success, None);
                } else {
                    finish(
                        attempt,
                        AttemptStatus::Failed,
                        Some("payment reported as failed in the UPI app".into()),
                    );
                }
            }
        }
    }
}

/// Map a direct (non-deferred) gateway outcome onto the attempt.
fn resolve_direct(attempt: &mut PaymentAttempt, outcome: GatewayOutcome) {
    match outcome {
        GatewayOutcome::Approved { external_ref } => {
            complete(attempt, external_ref);
        }
        GatewayOutcome::Declined { reason } => {
            finish(attempt, AttemptStatus::Failed, Some(reason));
        }
        GatewayOutcome::Unavailable { message } => {
            finish(attempt, AttemptStatus::Failed, Some(message));
        }
        GatewayOutcome::AwaitExternal { .. } | GatewayOutcome::RedirectInitiated { .. } => {
            warn!("deferred outcome from a direct gateway");
            finish(attempt, AttemptStatus::Failed, Some("payment could not be completed".into()));
        }
    }
}

fn finish(attempt: &mut PaymentAttempt, status: AttemptStatus, reason: Option<String>) {
    attempt.status = status;
    attempt.reason = reason;
    attempt.completed_at = Some(Utc::now());
}

fn complete(attempt: &mut PaymentAttempt, external_ref: Option<ExternalRef>) {
    attempt.status = AttemptStatus::Success;
    attempt.external_ref = external_ref;
    attempt.completed_at = Some(Utc::now());
}
