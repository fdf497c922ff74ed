//! Session state.
//!
//! The signed-in user is a record cached in storage under `dreamx_user`,
//! with the raw token duplicated under `token` for the checkout flow.
//! Writers notify subscribers through an owned watch channel rather than
//! relying on a cross-tab storage event, so same-tab views observe changes
//! too.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;

use crate::models::{ProfileUpdate, SessionRecord};
use crate::storage::{self, KeyValueStorage, keys};

/// The session store.
///
/// Cheaply cloneable; clones share storage and the change channel.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    changes: watch::Sender<()>,
}

impl SessionStore {
    /// Create a session store over the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let (changes, _) = watch::channel(());
        Self { storage, changes }
    }

    /// The current session record, if a user is signed in.
    ///
    /// A missing or unparseable record reads as signed-out.
    #[must_use]
    pub fn current(&self) -> Option<SessionRecord> {
        storage::get_json(self.storage.as_ref(), keys::USER)
    }

    /// The auth token: the standalone `token` key, falling back to the
    /// token embedded in the session record.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        if let Some(token) = self.storage.get(keys::TOKEN)
            && !token.trim().is_empty()
        {
            return Some(token);
        }
        self.current().and_then(|record| record.token)
    }

    /// Establish a session: persist the record and token, then notify
    /// subscribers.
    #[instrument(skip_all, fields(email = %record.email))]
    pub fn login(&self, token: &str, mut record: SessionRecord) {
        record.token = Some(token.to_owned());
        self.storage.set(keys::TOKEN, token);
        storage::set_json(self.storage.as_ref(), keys::USER, &record);
        self.notify();
    }

    /// Destroy the session: remove the record and token, then notify
    /// subscribers. Redirecting to the login view is the caller's job.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        self.storage.remove(keys::USER);
        self.storage.remove(keys::TOKEN);
        self.notify();
    }

    /// Merge profile edits into the stored record and notify subscribers.
    ///
    /// Non-brand accounts cannot carry a hero image; any submitted value is
    /// dropped for them. Returns the updated record, or `None` when no user
    /// is signed in.
    #[instrument(skip_all)]
    pub fn update_profile(&self, update: ProfileUpdate) -> Option<SessionRecord> {
        let mut record = self.current()?;
        record.email = update.email;
        record.first_name = update.first_name;
        record.last_name = update.last_name;
        record.bio = update.bio;
        record.hero_image = if record.is_brand {
            update.hero_image
        } else {
            None
        };
        storage::set_json(self.storage.as_ref(), keys::USER, &record);
        self.notify();
        Some(record)
    }

    /// The underlying storage, for flows that share keys with the session
    /// (pending verification, saved addresses).
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    /// Subscribe to session changes.
    ///
    /// The notification carries no payload; subscribers re-read
    /// [`SessionStore::current`] when it fires.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        // send_replace rather than send: notify even with no subscribers.
        self.changes.send_replace(());
    }
}
