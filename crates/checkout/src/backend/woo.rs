//! WooCommerce REST v3 client.
//!
//! Plain JSON over HTTP with basic auth (consumer key/secret). GET-style
//! reads retry with exponential backoff on transient failures and cache
//! through `moka` (5-minute TTL); order creation is a single POST, never
//! auto-retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use saffron_core::{Order, OrderId, ProductId};

use crate::config::{CheckoutConfig, HttpConfig};
use crate::order::payload::OrderPayload;

use super::cache::{CacheKey, CacheValue};
use super::{BackendError, CommerceBackend, PaymentGateway, Product, default_payment_gateways};

/// REST path of the WooCommerce v3 API.
const WC_ENDPOINT: &str = "/wp-json/wc/v3";

/// Client for the WooCommerce REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct WooClient {
    inner: Arc<WooClientInner>,
}

struct WooClientInner {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
    retry: HttpConfig,
    cache: Cache<CacheKey, CacheValue>,
}

impl WooClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &CheckoutConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.http.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(WooClientInner {
                client,
                base_url: format!("{}{WC_ENDPOINT}", config.store_url),
                consumer_key: config.consumer_key.expose_secret().to_string(),
                consumer_secret: config.consumer_secret.expose_secret().to_string(),
                retry: config.http,
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// One GET attempt, classified.
    async fn get_once<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self
            .inner
            .client
            .get(self.url(path))
            .basic_auth(&self.inner.consumer_key, Some(&self.inner.consumer_secret))
            .send()
            .await?;

        read_json(response).await
    }

    /// GET with exponential backoff on transient failures (timeout, 502,
    /// 503, 504), capped by the configured attempt count.
    async fn get_with_retry<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        retry_get(&self.inner.retry, path, || self.get_once(path)).await
    }
}

/// Drive `op` until it succeeds, fails non-transiently, or the attempt cap
/// is reached, sleeping the backoff delay between attempts.
async fn retry_get<T, F, Fut>(policy: &HttpConfig, path: &str, mut op: F) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.retry_attempts && is_transient(&err) => {
                let delay = backoff_delay(policy.retry_base_delay, attempt);
                warn!(
                    path,
                    attempt,
                    max = policy.retry_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "backend read failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Backoff for the given 1-based attempt: base × 2^(attempt − 1),
/// saturating rather than overflowing at large attempt counts.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Transient failures worth another attempt: request timeouts and gateway
/// unavailability on the server side.
fn is_transient(err: &BackendError) -> bool {
    match err {
        BackendError::Network(e) => e.is_timeout() || e.is_connect(),
        BackendError::Unexpected { status, .. } => matches!(status, 502 | 503 | 504),
        BackendError::Validation { .. } | BackendError::Auth { .. } => false,
    }
}

/// WooCommerce error body: `{code, message, data: {status}}`.
#[derive(Debug, Deserialize)]
struct WooErrorBody {
    #[serde(default)]
    message: String,
}

/// Parse a response, classifying non-success statuses.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<WooErrorBody>(&text)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| text.chars().take(200).collect());
        return Err(BackendError::from_status(status.as_u16(), message));
    }

    serde_json::from_str(&text).map_err(|e| {
        warn!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "failed to parse backend response"
        );
        BackendError::Unexpected {
            status: status.as_u16(),
            message: format!("unparseable response: {e}"),
        }
    })
}

#[async_trait::async_trait]
impl CommerceBackend for WooClient {
    /// Create an order with one POST. Not auto-retried: a timeout here is
    /// ambiguous (the order may exist server-side) and resubmission is a
    /// caller decision.
    #[instrument(skip_all, fields(payment_method = %payload.payment_method))]
    async fn create_order(&self, payload: &OrderPayload) -> Result<Order, BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("orders"))
            .basic_auth(&self.inner.consumer_key, Some(&self.inner.consumer_secret))
            .json(payload)
            .send()
            .await?;

        let order: Order = read_json(response).await?;
        debug!(order_id = %order.id, number = %order.number, "order created");
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, BackendError> {
        self.get_with_retry(&format!("orders/{id}")).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        let key = CacheKey::Product(id.as_i64());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            return Ok(*product);
        }

        let product: Product = self.get_with_retry(&format!("products/{id}")).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List the store's payment gateways.
    ///
    /// Falls back to the built-in default list when the endpoint fails, as
    /// the mobile client always has to offer *something* at checkout.
    async fn list_payment_gateways(&self) -> Result<Vec<PaymentGateway>, BackendError> {
        let key = CacheKey::PaymentGateways;
        if let Some(CacheValue::PaymentGateways(gateways)) = self.inner.cache.get(&key).await {
            return Ok(gateways);
        }

        match self.get_with_retry::<Vec<PaymentGateway>>("payment_gateways").await {
            Ok(gateways) => {
                self.inner
                    .cache
                    .insert(key, CacheValue::PaymentGateways(gateways.clone()))
                    .await;
                Ok(gateways)
            }
            Err(err) => {
                warn!(error = %err, "gateway listing failed, using built-in defaults");
                Ok(default_payment_gateways())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn policy() -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(5),
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(100),
        }
    }

    fn unavailable(status: u16) -> BackendError {
        BackendError::Unexpected {
            status,
            message: "upstream unavailable".into(),
        }
    }

    #[test]
    fn only_timeouts_and_gateway_statuses_are_transient() {
        assert!(is_transient(&unavailable(502)));
        assert!(is_transient(&unavailable(503)));
        assert!(is_transient(&unavailable(504)));
        assert!(!is_transient(&unavailable(500)));
        assert!(!is_transient(&BackendError::Validation {
            status: 400,
            message: "billing postcode is not valid".into(),
        }));
        assert!(!is_transient(&BackendError::Auth {
            status: 401,
            message: "invalid consumer key".into(),
        }));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(400));
    }

    #[test]
    fn backoff_saturates_at_large_attempt_counts() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 64), base.saturating_mul(u32::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_at_the_attempt_cap() {
        let calls = AtomicU32::new(0);
        let result: Result<u8, _> = retry_get(&policy(), "orders/1", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable(503)) }
        })
        .await;

        assert!(matches!(
            result,
            Err(BackendError::Unexpected { status: 503, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_get(&policy(), "products/7", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(unavailable(502))
                } else {
                    Ok(7_i64)
                }
            }
        })
        .await;

        assert_eq!(result.ok(), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_errors_fail_on_the_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<u8, _> = retry_get(&policy(), "orders/1", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(BackendError::Auth {
                    status: 401,
                    message: "invalid consumer key".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(BackendError::Auth { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
