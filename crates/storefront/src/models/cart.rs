//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry in the cart.
///
/// Lines are deduplicated on `(id, category, size)`: adding an item whose
/// tuple matches an existing line bumps that line's quantity instead of
/// appending a row.
///
/// Serialized field names match the browser storefront's persisted `cart`
/// array (`_id`, `selectedSize`) so existing local storage keeps working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier. Free-form here; checkout requires the strict
    /// 24-hex content-addressed shape and fails closed otherwise.
    #[serde(rename = "_id")]
    pub id: String,
    /// Product title.
    pub title: String,
    /// Unit price in rupees.
    pub price: Decimal,
    /// Number of units. Zero is never stored; see `CartStore::add`.
    pub quantity: u32,
    /// Product image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Product category, part of the dedup key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Selected variant (e.g., size), part of the dedup key.
    #[serde(default, rename = "selectedSize", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Pickup postal code recorded on the product, used as the delivery
    /// quote origin.
    #[serde(default, rename = "pincode", skip_serializing_if = "Option::is_none")]
    pub pickup_pincode: Option<String>,
}

impl CartItem {
    /// The line's dedup key: `(id, category, size)`.
    #[must_use]
    pub fn dedup_key(&self) -> (&str, Option<&str>, Option<&str>) {
        (self.id.as_str(), self.category.as_deref(), self.size.as_deref())
    }

    /// Price of the whole line (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
