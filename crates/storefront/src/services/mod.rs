//! Storefront services: the logic behind each page-level flow.

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod delivery;
pub mod session;
pub mod verification;

pub use addresses::AddressBook;
pub use auth::{AuthClient, AuthError, CallbackError};
pub use cart::{CartError, CartStore};
pub use checkout::{
    CheckoutError, CheckoutOutcome, CheckoutService, CheckoutStatus, GatewayError,
    PaymentCompletion, PaymentGateway, WidgetOptions,
};
pub use delivery::{DeliveryQuoteService, QuoteOutcome};
pub use session::SessionStore;
pub use verification::{VerificationFlow, VerificationState};
