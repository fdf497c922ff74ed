//! Core types for the Dream X Store client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pincode;
pub mod price;

pub use email::{Email, EmailError};
pub use id::{ProductId, ProductIdError};
pub use pincode::{Pincode, PincodeError};
pub use price::{CurrencyCode, Price};
