//! The cart store.
//!
//! Holds the list of cart line items and persists the full snapshot to
//! storage on every mutation, before the mutating call returns. Lines are
//! deduplicated on `(id, category, size)`.

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use crate::models::CartItem;
use crate::storage::{self, KeyValueStorage, keys};

/// Errors from cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantity must be a positive integer.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),
}

/// The shared cart, backed by injectable storage.
///
/// Cheaply cloneable; clones share the same line list and storage.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn KeyValueStorage>,
    items: Mutex<Vec<CartItem>>,
}

impl CartStore {
    /// Load the cart from storage.
    ///
    /// A missing or malformed persisted cart starts empty.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let items: Vec<CartItem> =
            storage::get_json(storage.as_ref(), keys::CART).unwrap_or_default();
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                items: Mutex::new(items),
            }),
        }
    }

    /// Add an item to the cart.
    ///
    /// If a line with the same `(id, category, size)` tuple exists its
    /// quantity is incremented; otherwise the item is appended. A zero
    /// quantity on the incoming item is treated as 1.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub fn add(&self, item: CartItem) {
        let mut items = self.lock();
        let added = item.quantity.max(1);

        if let Some(existing) = items
            .iter_mut()
            .find(|line| line.dedup_key() == item.dedup_key())
        {
            existing.quantity += added;
        } else {
            let mut line = item;
            line.quantity = added;
            items.push(line);
        }

        self.persist(&items);
    }

    /// Remove every line with the given product id.
    ///
    /// Removing an id that is not in the cart is a no-op.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) {
        let mut items = self.lock();
        items.retain(|line| line.id != id);
        self.persist(&items);
    }

    /// Replace the quantity of every line with the given product id.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity; callers
    /// remove lines explicitly instead of zeroing them out.
    #[instrument(skip(self))]
    pub fn set_quantity(&self, id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let mut items = self.lock();
        for line in items.iter_mut().filter(|line| line.id == id) {
            line.quantity = quantity;
        }
        self.persist(&items);
        Ok(())
    }

    /// Remove every line and the persisted snapshot.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let mut items = self.lock();
        items.clear();
        self.inner.storage.remove(keys::CART);
    }

    /// Snapshot of the current lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().clone()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sum of `price * quantity` across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lock().iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lock().iter().map(|line| line.quantity).sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartItem>> {
        self.inner
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[CartItem]) {
        storage::set_json(self.inner.storage.as_ref(), keys::CART, &items);
    }
}
