//! Checkout-time models: billing details, totals, quotes, saved addresses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing fields collected at checkout.
///
/// Transient: held by the checkout view until submission, never persisted.
/// Field names match the order API's payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    pub billing_customer_name: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_pincode: String,
    pub billing_state: String,
    pub billing_country: String,
    pub billing_email: String,
    pub billing_phone: String,
    /// Optional; not part of the required-field check.
    pub pickup_location: String,
}

impl BillingDetails {
    /// Names of the required fields that are currently empty.
    ///
    /// `pickup_location` is deliberately excluded.
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("billing_customer_name", &self.billing_customer_name),
            ("billing_address", &self.billing_address),
            ("billing_city", &self.billing_city),
            ("billing_pincode", &self.billing_pincode),
            ("billing_state", &self.billing_state),
            ("billing_country", &self.billing_country),
            ("billing_email", &self.billing_email),
            ("billing_phone", &self.billing_phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Order totals displayed and submitted at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Recompute from a subtotal and shipping charge. Tax is fixed at zero.
    #[must_use]
    pub fn recompute(subtotal: Decimal, shipping: Decimal) -> Self {
        let tax = Decimal::ZERO;
        Self {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }

    /// Apply a delivery charge, keeping subtotal and tax.
    #[must_use]
    pub fn with_shipping(self, shipping: Decimal) -> Self {
        Self::recompute(self.subtotal, shipping)
    }
}

/// A delivery cost estimate for a destination postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryQuote {
    /// Shipping charge in rupees.
    pub charge: Decimal,
    /// Courier's delivery estimate, verbatim from the pricing API.
    pub estimated_days: String,
}

/// A saved address book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub id: Uuid,
    pub text: String,
}
