//! Wire types for the order and auth APIs.
//!
//! Response shapes are defensive: upstream fields the client merely
//! forwards stay loosely typed, and anything the client branches on is
//! `Option`/defaulted so a missing field is a logic error we can report
//! rather than a parse failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{BillingDetails, Totals};

// =============================================================================
// Orders
// =============================================================================

/// One order line sent to `/getorderid`.
///
/// Only built from cart lines that passed the 24-hex id check; optional
/// cart fields are flattened to empty strings the way the API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub category: String,
    pub size: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
}

/// Request body for `POST /getorderid`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    /// The billing street address, duplicated at the top level.
    pub address: String,
    pub items: Vec<OrderItem>,
    pub totals: Totals,
    #[serde(flatten)]
    pub billing: BillingDetails,
}

/// Response body for `POST /getorderid`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub orderid: Option<OrderRef>,
}

/// The payment order reference inside a create-order response.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRef {
    #[serde(default)]
    pub id: Option<String>,
}

impl CreateOrderResponse {
    /// The order id, if the response actually carried one.
    #[must_use]
    pub fn order_id(self) -> Option<String> {
        self.orderid.and_then(|r| r.id).filter(|id| !id.is_empty())
    }
}

/// Request body for `POST /verifypayment`: the signed completion payload
/// returned by the payment widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

/// Request body for `POST /orders/get-delivery-price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPriceRequest {
    pub pickup_postcode: String,
    pub delivery_postcode: String,
}

/// Response body for `POST /orders/get-delivery-price`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryPriceResponse {
    pub delivery_cost: Decimal,
    /// Number or string upstream; normalized via
    /// [`DeliveryPriceResponse::estimated_days`].
    #[serde(default)]
    pub estimated_delivery_days: Option<Value>,
}

impl DeliveryPriceResponse {
    /// The delivery ETA as display text.
    #[must_use]
    pub fn estimated_days(&self) -> String {
        match &self.estimated_delivery_days {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user payload inside auth responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Response body for `POST /auth/login` and `POST /auth/verify-email`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Response body for `POST /auth/check-verification-status`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationStatusResponse {
    #[serde(default, rename = "isVerified")]
    pub is_verified: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Error body `{ "message": ... }` some endpoints return on non-2xx.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
