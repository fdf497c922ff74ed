//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DREAMX_RAZORPAY_KEY` - Publishable payment-widget key id
//!
//! ## Optional
//! - `DREAMX_PAY_API_URL` - Payment/order API base URL
//!   (default: <http://localhost:3001>)
//! - `DREAMX_AUTH_API_URL` - Auth API base URL
//!   (default: <http://localhost:3001/api>)
//! - `DREAMX_CHECKOUT_SCRIPT_URL` - Payment widget script URL
//! - `DREAMX_STORE_NAME` - Display name passed to the payment widget
//! - `DREAMX_THEME_COLOR` - Widget theme color

use thiserror::Error;
use url::Url;

/// Default payment widget script location.
const DEFAULT_CHECKOUT_SCRIPT_URL: &str = "https://checkout.razorpay.com/v1/checkout.js";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the payment/order API (`/getorderid`, `/verifypayment`,
    /// `/orders/get-delivery-price`).
    pub pay_api_url: Url,
    /// Base URL of the auth API (`/auth/login`, `/auth/verify-email`, ...).
    pub auth_api_url: Url,
    /// Publishable key id for the payment widget.
    pub razorpay_key: String,
    /// URL of the payment widget script.
    pub checkout_script_url: String,
    /// Store display name shown in the payment widget.
    pub store_name: String,
    /// Payment widget theme color.
    pub theme_color: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or URLs are
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let pay_api_url = get_url_or_default("DREAMX_PAY_API_URL", "http://localhost:3001")?;
        let auth_api_url =
            get_url_or_default("DREAMX_AUTH_API_URL", "http://localhost:3001/api")?;
        let razorpay_key = get_required_env("DREAMX_RAZORPAY_KEY")?;
        let checkout_script_url =
            get_env_or_default("DREAMX_CHECKOUT_SCRIPT_URL", DEFAULT_CHECKOUT_SCRIPT_URL);
        let store_name = get_env_or_default("DREAMX_STORE_NAME", "Dream X Store");
        let theme_color = get_env_or_default("DREAMX_THEME_COLOR", "#3399cc");

        Ok(Self {
            pay_api_url,
            auth_api_url,
            razorpay_key,
            checkout_script_url,
            store_name,
            theme_color,
        })
    }

    /// The Google sign-in entry point: the browser is redirected here and
    /// comes back through the OAuth callback.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the auth base URL cannot be extended.
    pub fn google_login_url(&self) -> Result<Url, ConfigError> {
        join_url(&self.auth_api_url, "auth/google")
            .map_err(|e| ConfigError::InvalidEnvVar("DREAMX_AUTH_API_URL".to_string(), e))
    }
}

/// Join a relative path onto a base URL, preserving the base path segment.
///
/// `Url::join` drops the final path segment of bases without a trailing
/// slash, which would turn `http://host/api` + `auth/login` into
/// `http://host/auth/login`.
pub(crate) fn join_url(base: &Url, path: &str) -> Result<Url, String> {
    let mut joined = base.clone();
    {
        let mut segments = joined
            .path_segments_mut()
            .map_err(|()| "base URL cannot be a base".to_string())?;
        segments.pop_if_empty();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            segments.push(segment);
        }
    }
    Ok(joined)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed as a URL, with a default value.
fn get_url_or_default(key: &str, default: &str) -> Result<Url, ConfigError> {
    get_env_or_default(key, default)
        .parse::<Url>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
