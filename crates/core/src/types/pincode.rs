//! Indian postal code (PIN code) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    /// The input string has the wrong length.
    #[error("pincode must be exactly {expected} digits (got {got} characters)")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Actual length of the input.
        got: usize,
    },
    /// The input contains a non-digit character.
    #[error("pincode must contain only digits")]
    NotNumeric,
}

/// A six-digit Indian postal code.
///
/// Delivery quote lookups only fire once a destination input parses as a
/// `Pincode`; shorter or longer inputs are not sent anywhere.
///
/// ## Examples
///
/// ```
/// use dreamx_core::Pincode;
///
/// assert!(Pincode::parse("560066").is_ok());
/// assert!(Pincode::parse("5600").is_err());
/// assert!(Pincode::parse("56006a").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Exact length of a PIN code.
    pub const LENGTH: usize = 6;

    /// Parse a `Pincode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 6 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        if s.len() != Self::LENGTH {
            return Err(PincodeError::WrongLength {
                expected: Self::LENGTH,
                got: s.len(),
            });
        }

        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PincodeError::NotNumeric);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Pincode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pincode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
