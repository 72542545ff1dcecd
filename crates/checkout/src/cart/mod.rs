//! The cart store: line items, derived totals, and local persistence.
//!
//! Mutation semantics live on [`CartState`] in `saffron-core`; this store
//! adds shared ownership and the persistence policy: after every mutation
//! the full snapshot is written to the key-value store fire-and-forget.
//! Persistence failures are logged and non-fatal - the in-memory state is
//! authoritative and callers are never blocked on storage I/O.

pub mod storage;

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use saffron_core::{CartState, ProductId, ProductRef};

use storage::{KeyValueStore, keys};

/// Shared handle to the cart.
///
/// Cheaply cloneable; all clones see the same state. Mutations are not
/// serialized beyond an internal short-lived lock - the UI is expected to
/// disable controls during an in-flight submission rather than rely on the
/// data layer for coordination.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    state: Mutex<CartState>,
    storage: Arc<dyn KeyValueStore>,
}

impl CartStore {
    /// Create an empty cart over `storage` without reading a snapshot.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(CartInner {
                state: Mutex::new(CartState::empty()),
                storage,
            }),
        }
    }

    /// Create the cart and merge in any persisted snapshot.
    ///
    /// Called once at startup, before the cart is first used. A missing or
    /// corrupt snapshot falls back to an empty cart; the failure is logged,
    /// never surfaced.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);

        match store.inner.storage.get(keys::CART).await {
            Ok(Some(json)) => match serde_json::from_str::<CartState>(&json) {
                Ok(snapshot) => {
                    debug!(items = snapshot.items.len(), "restored cart snapshot");
                    *store.lock() = snapshot;
                }
                Err(e) => warn!(error = %e, "discarding corrupt cart snapshot"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to read cart snapshot"),
        }

        store
    }

    /// Add `quantity` of `product`, merging by product id.
    /// Quantities below 1 are rejected as a no-op.
    pub fn add_item(&self, product: ProductRef, quantity: u32) {
        self.mutate(|cart| cart.add_item(product, quantity));
    }

    /// Remove the line for `product_id`; absent id is a no-op.
    pub fn remove_item(&self, product_id: ProductId) {
        self.mutate(|cart| cart.remove_item(product_id));
    }

    /// Replace the quantity for `product_id`; zero removes the line.
    pub fn set_quantity(&self, product_id: ProductId, quantity: u32) {
        self.mutate(|cart| cart.set_quantity(product_id, quantity));
    }

    /// Empty the cart and zero the totals.
    ///
    /// Called by the order submitter exactly once, on confirmed creation.
    pub fn clear(&self) {
        self.mutate(CartState::clear);
    }

    /// Owned copy of the current state. Order drafts are built from this
    /// copy so a race with further cart edits cannot corrupt an in-flight
    /// order.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.lock().clone()
    }

    /// Quantity of `product_id` in the cart, zero if absent.
    #[must_use]
    pub fn item_quantity(&self, product_id: ProductId) -> u32 {
        self.lock().item_quantity(product_id)
    }

    /// Whether the cart holds a line for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lock().contains(product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lock().total_items
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lock().total_price
    }

    /// Write the current snapshot and wait for the write to land.
    ///
    /// The mutation path persists fire-and-forget; call this before the
    /// process exits (or the host suspends) when the write must survive.
    ///
    /// # Errors
    ///
    /// Surfaces the storage failure instead of logging it.
    pub async fn flush(&self) -> Result<(), storage::StorageError> {
        let json = serde_json::to_string(&self.snapshot())?;
        self.inner.storage.set(keys::CART, json).await
    }

    /// Apply a mutation, then persist the resulting snapshot.
    fn mutate(&self, f: impl FnOnce(&mut CartState)) {
        let snapshot = {
            let mut state = self.lock();
            f(&mut state);
            state.clone()
        };
        self.persist(snapshot);
    }

    /// Fire-and-forget snapshot write. No ordering guarantee is needed:
    /// the cart reloads as a whole snapshot, so last-write-wins is correct.
    fn persist(&self, snapshot: CartState) {
        let storage = Arc::clone(&self.inner.storage);
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize cart snapshot");
                return;
            }
        };
        tokio::spawn(async move {
            if let Err(e) = storage.set(keys::CART, json).await {
                warn!(error = %e, "failed to persist cart snapshot");
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartState> {
        // A poisoned cart lock means a panic mid-mutation; the totals are
        // recomputed from items on the next mutation, so continuing is safe.
        self.inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
