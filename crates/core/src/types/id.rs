//! Content-addressed product identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input string has the wrong length.
    #[error("product id must be exactly {expected} characters (got {got})")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Actual length of the input.
        got: usize,
    },
    /// The input contains a character outside `[0-9a-fA-F]`.
    #[error("product id must contain only hexadecimal characters")]
    NotHex,
}

/// A product identifier.
///
/// Product ids are content-addressed: exactly 24 hexadecimal characters.
/// Cart lines whose id does not have this shape are rejected before any
/// order is created.
///
/// ## Examples
///
/// ```
/// use dreamx_core::ProductId;
///
/// assert!(ProductId::parse("5f8d0d55b54764421b7156c3").is_ok());
/// assert!(ProductId::parse("not-a-product-id").is_err());
/// assert!(ProductId::parse("5f8d0d55b54764421b7156").is_err()); // too short
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Exact length of a product id.
    pub const LENGTH: usize = 24;

    /// Parse a `ProductId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 24 hexadecimal
    /// characters.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        if s.len() != Self::LENGTH {
            return Err(ProductIdError::WrongLength {
                expected: Self::LENGTH,
                got: s.len(),
            });
        }

        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ProductIdError::NotHex);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
