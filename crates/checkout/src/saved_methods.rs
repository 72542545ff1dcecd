//! Saved payment-method list, persisted under its own storage key.
//!
//! Checkout consumes this only to pre-fill method selection. It is never
//! authoritative for a payment outcome.

use std::sync::Arc;

use tracing::warn;

use saffron_core::SavedPaymentMethod;

use crate::cart::storage::{KeyValueStore, StorageError, keys};

/// Load the saved method list, defaulting to empty on absence or corruption.
pub async fn load(storage: &Arc<dyn KeyValueStore>) -> Vec<SavedPaymentMethod> {
    match storage.get(keys::PAYMENT_METHODS).await {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(error = %e, "discarding corrupt saved payment methods");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read saved payment methods");
            Vec::new()
        }
    }
}

/// Persist the saved method list.
///
/// # Errors
///
/// Returns storage errors; unlike cart persistence this write is explicit
/// user intent, so failures are surfaced.
pub async fn save(
    storage: &Arc<dyn KeyValueStore>,
    methods: &[SavedPaymentMethod],
) -> Result<(), StorageError> {
    let json = serde_json::to_string(methods)?;
    storage.set(keys::PAYMENT_METHODS, json).await
}

/// The default entry, if the user marked one.
#[must_use]
pub fn default_method(methods: &[SavedPaymentMethod]) -> Option<&SavedPaymentMethod> {
    methods.iter().find(|m| m.is_default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::storage::MemoryStore;
    use saffron_core::PaymentMethod;

    #[tokio::test]
    async fn test_roundtrip_and_default_selection() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let methods = vec![
            SavedPaymentMethod {
                method: PaymentMethod::CardGateway,
                label: "Visa ending 4242".into(),
                is_default: false,
            },
            SavedPaymentMethod {
                method: PaymentMethod::Upi,
                label: "asha@upi".into(),
                is_default: true,
            },
        ];

        save(&storage, &methods).await.unwrap();
        let loaded = load(&storage).await;
        assert_eq!(loaded, methods);
        assert_eq!(
            default_method(&loaded).map(|m| m.method),
            Some(PaymentMethod::Upi)
        );
    }

    #[tokio::test]
    async fn test_corrupt_list_loads_empty() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        storage
            .set(keys::PAYMENT_METHODS, "][".into())
            .await
            .unwrap();
        assert!(load(&storage).await.is_empty());
    }
}
