//! Domain models persisted to storage or held by checkout.

pub mod cart;
pub mod checkout;
pub mod user;

pub use cart::CartItem;
pub use checkout::{BillingDetails, DeliveryQuote, SavedAddress, Totals};
pub use user::{ProfileUpdate, SessionRecord};
