//! The saved-address book, persisted alongside the session.

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::models::SavedAddress;
use crate::storage::{self, KeyValueStorage, keys};

/// Saved delivery addresses, persisted as a JSON list.
pub struct AddressBook {
    storage: Arc<dyn KeyValueStorage>,
}

impl AddressBook {
    /// Create an address book over the given storage.
    #[must_use]
    pub const fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// All saved addresses, oldest first.
    ///
    /// A missing or malformed list reads as empty.
    #[must_use]
    pub fn all(&self) -> Vec<SavedAddress> {
        storage::get_json(self.storage.as_ref(), keys::ADDRESSES).unwrap_or_default()
    }

    /// Save an address and return the stored entry.
    ///
    /// Blank input is ignored and returns `None`.
    #[instrument(skip_all)]
    pub fn add(&self, text: &str) -> Option<SavedAddress> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let entry = SavedAddress {
            id: Uuid::new_v4(),
            text: text.to_owned(),
        };
        let mut entries = self.all();
        entries.push(entry.clone());
        storage::set_json(self.storage.as_ref(), keys::ADDRESSES, &entries);
        Some(entry)
    }

    /// Delete the address with the given id. Unknown ids are a no-op.
    #[instrument(skip(self))]
    pub fn remove(&self, id: Uuid) {
        let mut entries = self.all();
        entries.retain(|entry| entry.id != id);
        storage::set_json(self.storage.as_ref(), keys::ADDRESSES, &entries);
    }
}
