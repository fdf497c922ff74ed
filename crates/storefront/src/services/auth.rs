//! Authentication flows: password login, the OAuth callback, and
//! verification bookkeeping.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use dreamx_core::{Email, EmailError};

use crate::api::types::LoginRequest;
use crate::api::{ApiError, AuthApi};
use crate::models::SessionRecord;
use crate::services::session::SessionStore;
use crate::storage::keys;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The server rejected the request with a message.
    #[error("{message}")]
    Rejected { message: String },

    /// The server response was missing the token or user payload.
    #[error("malformed auth response")]
    MalformedResponse,

    /// Remote call failed.
    #[error("api error: {0}")]
    Api(ApiError),
}

impl From<ApiError> for AuthError {
    /// Non-2xx responses with a `{ "message": ... }` body become
    /// [`AuthError::Rejected`] so the message can be shown to the user;
    /// everything else stays an API error.
    fn from(error: ApiError) -> Self {
        if let ApiError::Status { body, .. } = &error
            && let Ok(parsed) = serde_json::from_str::<crate::api::types::ApiErrorBody>(body)
            && let Some(message) = parsed.message
        {
            return Self::Rejected { message };
        }
        Self::Api(error)
    }
}

/// Errors completing the OAuth redirect callback.
///
/// Each variant maps to the query-string reason the login view shows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackError {
    /// The provider redirect was missing the token or user parameter.
    #[error("OAuth redirect missing token or user data")]
    MissingParams,

    /// The user query parameter was not valid JSON.
    #[error("OAuth user payload could not be parsed")]
    InvalidUserData,
}

impl CallbackError {
    /// The `error` query value the signup view understands.
    #[must_use]
    pub const fn redirect_reason(&self) -> &'static str {
        match self {
            Self::MissingParams => "google-auth-failed",
            Self::InvalidUserData => "invalid-user-data",
        }
    }
}

/// Authentication client.
pub struct AuthClient<A: AuthApi> {
    api: Arc<A>,
    session: SessionStore,
}

impl<A: AuthApi> AuthClient<A> {
    /// Create an auth client.
    #[must_use]
    pub const fn new(api: Arc<A>, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Log in with email and password and establish the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address,
    /// `AuthError::Rejected` with the server's message for refused
    /// credentials, and `AuthError::MalformedResponse` if the server
    /// answered 2xx without a token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionRecord, AuthError> {
        let email = Email::parse(email)?;

        let response = self
            .api
            .login(&LoginRequest {
                email: email.as_str().to_owned(),
                password: password.to_owned(),
            })
            .await?;

        let token = response.token.ok_or(AuthError::MalformedResponse)?;
        let user = response.user.unwrap_or_default();

        let record = SessionRecord::for_login(&user.username, &user.email, &token);
        self.session.login(&token, record.clone());
        tracing::info!(email = %record.email, "logged in");
        Ok(record)
    }

    /// Complete the OAuth provider redirect.
    ///
    /// The provider sends the browser back with `token` and `user` (a JSON
    /// record) query parameters; both are required.
    ///
    /// # Errors
    ///
    /// Returns a [`CallbackError`] naming the redirect reason the signup
    /// view expects.
    #[instrument(skip_all)]
    pub fn complete_oauth_callback(
        &self,
        token: Option<&str>,
        user_json: Option<&str>,
    ) -> Result<SessionRecord, CallbackError> {
        let (Some(token), Some(user_json)) = (token, user_json) else {
            return Err(CallbackError::MissingParams);
        };

        let record: SessionRecord =
            serde_json::from_str(user_json).map_err(|error| {
                tracing::warn!(%error, "unparseable OAuth user payload");
                CallbackError::InvalidUserData
            })?;

        self.session.login(token, record.clone());
        Ok(record)
    }

    /// Record that `email` is awaiting verification via the mailed link.
    pub fn begin_verification(&self, email: &Email) {
        self.session
            .storage()
            .set(keys::PENDING_VERIFICATION_EMAIL, email.as_str());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::types::{
        AuthResponse, AuthUser, VerificationStatusResponse,
    };
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// AuthApi fake with canned responses.
    struct FakeAuthApi {
        login_response: Mutex<Option<Result<AuthResponse, ApiError>>>,
    }

    #[async_trait]
    impl AuthApi for FakeAuthApi {
        async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, ApiError> {
            self.login_response
                .lock()
                .unwrap()
                .take()
                .expect("unexpected login call")
        }

        async fn verify_email(&self, _token: &str) -> Result<AuthResponse, ApiError> {
            panic!("not used in these tests")
        }

        async fn check_verification_status(
            &self,
            _email: &str,
        ) -> Result<VerificationStatusResponse, ApiError> {
            panic!("not used in these tests")
        }
    }

    fn client(response: Result<AuthResponse, ApiError>) -> (Arc<MemoryStorage>, AuthClient<FakeAuthApi>) {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::new(storage.clone());
        let api = Arc::new(FakeAuthApi {
            login_response: Mutex::new(Some(response)),
        });
        (storage, AuthClient::new(api, session))
    }

    #[tokio::test]
    async fn test_login_establishes_session() {
        let (storage, client) = client(Ok(AuthResponse {
            token: Some("jwt".to_string()),
            user: Some(AuthUser {
                id: Some("u1".to_string()),
                username: "asha".to_string(),
                email: "asha@example.com".to_string(),
            }),
        }));

        let record = client.login("asha@example.com", "hunter22").await.unwrap();
        assert_eq!(record.first_name, "asha");
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some("jwt"));
    }

    #[tokio::test]
    async fn test_login_invalid_email_never_calls_api() {
        let (_, client) = client(Err(ApiError::Url("unused".to_string())));
        let result = client.login("not-an-email", "pw").await;
        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
        // The canned response is still unconsumed.
        assert!(client.api.login_response.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_maps_server_message() {
        let (_, client) = client(Err(ApiError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: r#"{"message":"Invalid email or password"}"#.to_string(),
        }));
        let result = client.login("a@b.c", "pw").await;
        match result {
            Err(AuthError::Rejected { message }) => {
                assert_eq!(message, "Invalid email or password");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_without_token_is_malformed() {
        let (_, client) = client(Ok(AuthResponse {
            token: None,
            user: None,
        }));
        let result = client.login("a@b.c", "pw").await;
        assert!(matches!(result, Err(AuthError::MalformedResponse)));
    }

    #[test]
    fn test_callback_missing_params() {
        let (_, client) = client(Err(ApiError::Url("unused".to_string())));
        let result = client.complete_oauth_callback(Some("jwt"), None);
        assert_eq!(result.unwrap_err().redirect_reason(), "google-auth-failed");
    }

    #[test]
    fn test_callback_invalid_user_json() {
        let (_, client) = client(Err(ApiError::Url("unused".to_string())));
        let result = client.complete_oauth_callback(Some("jwt"), Some("{broken"));
        assert_eq!(result.unwrap_err().redirect_reason(), "invalid-user-data");
    }

    #[test]
    fn test_callback_success_writes_session() {
        let (storage, client) = client(Err(ApiError::Url("unused".to_string())));
        let record = client
            .complete_oauth_callback(
                Some("jwt"),
                Some(r#"{"firstName":"Asha","email":"asha@example.com"}"#),
            )
            .unwrap();
        assert_eq!(record.first_name, "Asha");
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some("jwt"));
    }

    #[test]
    fn test_begin_verification_sets_marker() {
        let (storage, client) = client(Err(ApiError::Url("unused".to_string())));
        client.begin_verification(&Email::parse("asha@example.com").unwrap());
        assert_eq!(
            storage.get(keys::PENDING_VERIFICATION_EMAIL).as_deref(),
            Some("asha@example.com")
        );
    }
}
