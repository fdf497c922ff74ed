//! Dreamx Storefront - headless client for the Dream X Store.
//!
//! This crate provides the storefront's state and protocol logic as a
//! library, independent of any particular view layer:
//!
//! - [`services::cart`] - cart lines persisted through injectable storage
//! - [`services::session`] - cached user record with a change broadcast
//! - [`services::auth`] - password login, OAuth callback, verification entry
//! - [`services::verification`] - email verification state machine + polling
//! - [`services::checkout`] - order creation and payment-widget orchestration
//! - [`services::delivery`] - postal-code delivery quotes
//!
//! # Architecture
//!
//! All browser-local state goes through the [`storage::KeyValueStorage`]
//! trait, so hosts can supply real persistent storage while tests use
//! [`storage::MemoryStorage`]. Remote calls go through the [`api`] traits,
//! implemented over `reqwest` by [`api::ApiClient`], and the payment widget
//! is abstracted behind [`services::checkout::PaymentGateway`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
