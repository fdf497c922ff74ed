//! Dreamx Core - Shared types library.
//!
//! This crate provides the domain types shared across the Dream X Store
//! client crates, chiefly the `storefront` crate (cart, checkout, session).
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, postal codes, emails, and
//!   prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
