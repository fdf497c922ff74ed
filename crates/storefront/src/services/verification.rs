//! Email verification flow.
//!
//! A small state machine: `Verifying` on entry, then `Verified`, `Failed`,
//! or `Waiting`. Waiting polls the check-status endpoint every five seconds
//! until the address is verified or the owning view shuts the flow down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, interval_at};
use tracing::instrument;

use crate::api::AuthApi;
use crate::models::SessionRecord;
use crate::services::auth::AuthError;
use crate::services::session::SessionStore;
use crate::storage::keys;

/// Interval between verification status polls.
const POLL_PERIOD: Duration = Duration::from_secs(5);

/// States of the verification flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationState {
    /// A token verification call is in flight.
    Verifying,
    /// The address is verified and a session is established.
    Verified,
    /// Verification failed; terminal until the user navigates away.
    Failed(String),
    /// No token yet; waiting for the user to click the mailed link.
    Waiting,
}

/// The email verification flow.
pub struct VerificationFlow<A: AuthApi> {
    api: Arc<A>,
    session: SessionStore,
    state: watch::Sender<VerificationState>,
}

impl<A: AuthApi> VerificationFlow<A> {
    /// Create a flow in the `Verifying` state.
    #[must_use]
    pub fn new(api: Arc<A>, session: SessionStore) -> Self {
        let (state, _) = watch::channel(VerificationState::Verifying);
        Self { api, session, state }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> VerificationState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<VerificationState> {
        self.state.subscribe()
    }

    /// Run the flow's entry transition.
    ///
    /// With a token (from the mailed link's query parameter) the token is
    /// redeemed immediately. Without one, a pending-email marker moves the
    /// flow to `Waiting` for [`VerificationFlow::poll_until_verified`];
    /// no marker either means there is nothing to verify.
    #[instrument(skip_all, fields(has_token = token.is_some()))]
    pub async fn start(&self, token: Option<&str>) -> VerificationState {
        let next = match token {
            Some(token) => self.redeem_token(token).await,
            None => {
                if self.pending_email().is_some() {
                    VerificationState::Waiting
                } else {
                    VerificationState::Failed(
                        "No verification in progress. Please sign up first.".to_string(),
                    )
                }
            }
        };
        self.state.send_replace(next.clone());
        next
    }

    /// Poll the check-status endpoint until verified or shut down.
    ///
    /// Only runs from the `Waiting` state. The first poll fires one period
    /// after entry, then every period; poll errors are ignored. Sending
    /// `true` on the shutdown channel (or dropping its sender) stops the
    /// loop without a state change, mirroring view teardown.
    #[instrument(skip_all)]
    pub async fn poll_until_verified(&self, mut shutdown: watch::Receiver<bool>) {
        if *self.state.borrow() != VerificationState::Waiting {
            return;
        }

        let mut ticker = interval_at(Instant::now() + POLL_PERIOD, POLL_PERIOD);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // Err means the sender is gone; either way, stop.
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("verification polling shut down");
                        return;
                    }
                }
                _ = ticker.tick() => {
                    if self.poll_once().await {
                        return;
                    }
                }
            }
        }
    }

    /// One status poll. Returns `true` when polling should stop.
    async fn poll_once(&self) -> bool {
        let Some(email) = self.pending_email() else {
            // Marker cleared elsewhere; nothing left to wait for.
            return true;
        };

        match self.api.check_verification_status(&email).await {
            Ok(status) if status.is_verified => {
                self.session
                    .storage()
                    .remove(keys::PENDING_VERIFICATION_EMAIL);
                let user = status.user.unwrap_or_default();
                if let Some(token) = status.token {
                    self.session.login(
                        &token,
                        SessionRecord::for_login(&user.username, &user.email, &token),
                    );
                } else {
                    tracing::warn!("verified status response carried no token");
                }
                self.state.send_replace(VerificationState::Verified);
                true
            }
            Ok(_) => false,
            Err(error) => {
                // Polling errors are transient; keep waiting.
                tracing::debug!(%error, "verification status poll failed");
                false
            }
        }
    }

    async fn redeem_token(&self, token: &str) -> VerificationState {
        match self.api.verify_email(token).await {
            Ok(response) => {
                self.session
                    .storage()
                    .remove(keys::PENDING_VERIFICATION_EMAIL);
                let user = response.user.unwrap_or_default();
                if let Some(session_token) = response.token {
                    self.session.login(
                        &session_token,
                        SessionRecord::for_login(&user.username, &user.email, &session_token),
                    );
                } else {
                    tracing::warn!("verify-email response carried no token");
                }
                VerificationState::Verified
            }
            Err(error) => {
                let message = match AuthError::from(error) {
                    AuthError::Rejected { message } => message,
                    other => {
                        tracing::error!(%other, "email verification failed");
                        "Verification failed".to_string()
                    }
                };
                VerificationState::Failed(message)
            }
        }
    }

    fn pending_email(&self) -> Option<String> {
        self.session
            .storage()
            .get(keys::PENDING_VERIFICATION_EMAIL)
            .filter(|email| !email.is_empty())
    }
}
