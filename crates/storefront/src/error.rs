//! Crate-wide error type.
//!
//! Each flow has its own error enum next to its service; this aggregate
//! exists for hosts that drive several flows behind one surface and want a
//! single `Result` type and a single place to turn errors into display
//! text.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::checkout::{CheckoutError, GatewayError};

/// Any storefront error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl Error {
    /// Text suitable for showing to the shopper.
    ///
    /// Auth rejections pass the server's message through; checkout errors
    /// use their own mapping; everything else gets a generic line so
    /// internals stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Checkout(error) => error.user_message().to_string(),
            Self::Auth(AuthError::Rejected { message }) => message.clone(),
            Self::Auth(AuthError::InvalidEmail(error)) => error.to_string(),
            Self::Cart(error) => error.to_string(),
            Self::Config(_) | Self::Api(_) | Self::Gateway(_) | Self::Auth(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Convenience alias for fallible storefront operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
