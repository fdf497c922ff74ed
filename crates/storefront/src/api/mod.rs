//! Remote API client.
//!
//! The storefront talks to two plain JSON-over-HTTP services: the auth API
//! and the payment/order API. [`ApiClient`] implements both behind the
//! [`OrdersApi`] and [`AuthApi`] traits so services can be tested against
//! in-process fakes.

pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::{StorefrontConfig, join_url};
use types::{
    AuthResponse, CreateOrderRequest, CreateOrderResponse, DeliveryPriceRequest,
    DeliveryPriceResponse, LoginRequest, VerificationStatusResponse, VerifyPaymentRequest,
};

/// Errors from remote API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, ...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {status}")]
    Status {
        status: reqwest::StatusCode,
        /// Response body, truncated for logging.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be constructed.
    #[error("invalid request url: {0}")]
    Url(String),
}

// =============================================================================
// API traits
// =============================================================================

/// Payment/order API operations.
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// `POST /getorderid` - create a payment order for the given cart.
    async fn create_order(
        &self,
        token: &str,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError>;

    /// `POST /verifypayment` - submit the widget's signed completion payload.
    async fn verify_payment(
        &self,
        token: &str,
        request: &VerifyPaymentRequest,
    ) -> Result<(), ApiError>;

    /// `POST /orders/get-delivery-price` - quote shipping between two
    /// postal codes.
    async fn delivery_price(
        &self,
        request: &DeliveryPriceRequest,
    ) -> Result<DeliveryPriceResponse, ApiError>;
}

/// Auth API operations.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login` - password login.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    /// `POST /auth/verify-email` - redeem an emailed verification token.
    async fn verify_email(&self, token: &str) -> Result<AuthResponse, ApiError>;

    /// `POST /auth/check-verification-status` - poll whether an address has
    /// been verified out-of-band.
    async fn check_verification_status(
        &self,
        email: &str,
    ) -> Result<VerificationStatusResponse, ApiError>;
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the remote storefront APIs.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    pay_base: Url,
    auth_base: Url,
}

impl ApiClient {
    /// Create a new API client from configuration.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                pay_base: config.pay_api_url.clone(),
                auth_base: config.auth_api_url.clone(),
            }),
        }
    }

    fn pay_url(&self, path: &str) -> Result<Url, ApiError> {
        join_url(&self.inner.pay_base, path).map_err(ApiError::Url)
    }

    fn auth_url(&self, path: &str) -> Result<Url, ApiError> {
        join_url(&self.inner.auth_base, path).map_err(ApiError::Url)
    }

    /// Execute a JSON POST and parse the response.
    async fn post_json<B, T>(
        &self,
        url: Url,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self
            .inner
            .client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .json(body);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                url = %url,
                status = %status,
                body = %truncate(&response_text, 500),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: truncate(&response_text, 500),
            });
        }

        match serde_json::from_str(&response_text) {
            Ok(parsed) => Ok(parsed),
            Err(error) => {
                tracing::error!(
                    url = %url,
                    %error,
                    body = %truncate(&response_text, 500),
                    "failed to parse API response"
                );
                Err(ApiError::Parse(error))
            }
        }
    }

    /// Execute a JSON POST where only the response status matters.
    async fn post_unit<B>(
        &self,
        url: Url,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + Sync,
    {
        let mut request = self
            .inner
            .client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .json(body);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                url = %url,
                status = %status,
                body = %truncate(&body, 500),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: truncate(&body, 500),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl OrdersApi for ApiClient {
    #[instrument(skip(self, token, request))]
    async fn create_order(
        &self,
        token: &str,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let url = self.pay_url("getorderid")?;
        self.post_json(url, request, Some(token)).await
    }

    #[instrument(skip(self, token, request))]
    async fn verify_payment(
        &self,
        token: &str,
        request: &VerifyPaymentRequest,
    ) -> Result<(), ApiError> {
        let url = self.pay_url("verifypayment")?;
        // Only the status matters; the body is not inspected.
        self.post_unit(url, request, Some(token)).await
    }

    #[instrument(skip(self, request))]
    async fn delivery_price(
        &self,
        request: &DeliveryPriceRequest,
    ) -> Result<DeliveryPriceResponse, ApiError> {
        let url = self.pay_url("orders/get-delivery-price")?;
        self.post_json(url, request, None).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    #[instrument(skip(self, request))]
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let url = self.auth_url("auth/login")?;
        self.post_json(url, request, None).await
    }

    #[instrument(skip(self, token))]
    async fn verify_email(&self, token: &str) -> Result<AuthResponse, ApiError> {
        let url = self.auth_url("auth/verify-email")?;
        self.post_json(url, &serde_json::json!({ "token": token }), None)
            .await
    }

    #[instrument(skip(self))]
    async fn check_verification_status(
        &self,
        email: &str,
    ) -> Result<VerificationStatusResponse, ApiError> {
        let url = self.auth_url("auth/check-verification-status")?;
        self.post_json(url, &serde_json::json!({ "email": email }), None)
            .await
    }
}

/// Truncate a response body for logs and error payloads.
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;

    fn client() -> ApiClient {
        ApiClient::new(&StorefrontConfig {
            pay_api_url: "https://pay.example.com".parse().unwrap(),
            auth_api_url: "https://api.example.com/api".parse().unwrap(),
            razorpay_key: "rzp_test_key".to_string(),
            checkout_script_url: String::new(),
            store_name: String::new(),
            theme_color: String::new(),
        })
    }

    #[test]
    fn test_pay_urls() {
        let client = client();
        assert_eq!(
            client.pay_url("getorderid").unwrap().as_str(),
            "https://pay.example.com/getorderid"
        );
        assert_eq!(
            client.pay_url("orders/get-delivery-price").unwrap().as_str(),
            "https://pay.example.com/orders/get-delivery-price"
        );
    }

    #[test]
    fn test_auth_urls_keep_api_prefix() {
        let client = client();
        assert_eq!(
            client.auth_url("auth/login").unwrap().as_str(),
            "https://api.example.com/api/auth/login"
        );
        assert_eq!(
            client
                .auth_url("auth/check-verification-status")
                .unwrap()
                .as_str(),
            "https://api.example.com/api/auth/check-verification-status"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
