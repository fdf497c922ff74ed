//! Checkout orchestration.
//!
//! Validates billing fields and cart shape, creates a payment order
//! remotely, opens the external payment widget, and submits the widget's
//! signed completion payload for verification. Strictly sequential: no two
//! remote calls are ever in flight at once.
//!
//! The flow reports `PaymentPending` while the widget is open and only
//! reports `Confirmed` once the verify-payment call succeeds; there is no
//! optimistic success message.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;

use dreamx_core::{Price, ProductId};

use crate::api::types::{CreateOrderRequest, OrderItem, VerifyPaymentRequest};
use crate::api::{ApiError, OrdersApi};
use crate::config::StorefrontConfig;
use crate::models::{BillingDetails, CartItem, Totals};
use crate::services::cart::CartStore;
use crate::services::session::SessionStore;

// =============================================================================
// Payment gateway abstraction
// =============================================================================

/// Errors from the payment widget host.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The widget script could not be fetched.
    #[error("payment widget script failed to load")]
    ScriptLoad,

    /// The user closed the widget without paying.
    #[error("payment widget dismissed")]
    Dismissed,

    /// The widget reported an error.
    #[error("payment widget error: {0}")]
    Widget(String),
}

/// The widget's signed completion payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCompletion {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
}

/// Options handed to the payment widget.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetOptions {
    pub key: String,
    /// Amount in minor units, as a string - the widget's expected shape.
    pub amount: String,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: WidgetPrefill,
    pub notes: WidgetNotes,
    pub theme: WidgetTheme,
}

/// Prefilled contact fields for the widget.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Free-form notes attached to the payment.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetNotes {
    pub address: String,
}

/// Widget theme.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetTheme {
    pub color: String,
}

/// Host-side payment widget integration.
///
/// A browser host loads the checkout script and bridges to the vendor
/// object; tests use an in-process fake.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Make sure the widget script is available. Idempotent.
    async fn ensure_loaded(&self, script_url: &str) -> Result<(), GatewayError>;

    /// Open the widget and wait for its completion payload.
    async fn open(&self, options: WidgetOptions) -> Result<PaymentCompletion, GatewayError>;
}

// =============================================================================
// Errors and status
// =============================================================================

/// Errors that abort a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Required billing fields are empty.
    #[error("missing billing fields: {0:?}")]
    MissingBillingFields(Vec<&'static str>),

    /// The order total is not a positive amount.
    #[error("order total must be positive (got {0})")]
    InvalidAmount(Decimal),

    /// No usable auth token (absent, malformed, or expired).
    #[error("no valid auth token")]
    NotLoggedIn,

    /// One or more cart lines failed the product-id check. Fail-closed:
    /// the whole checkout aborts rather than ordering a subset.
    #[error("{invalid} of {total} cart lines failed validation")]
    InvalidCartItems { invalid: usize, total: usize },

    /// The create-order response carried no order id.
    #[error("order response carried no order id")]
    MissingOrderId,

    /// Widget failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Remote call failure.
    #[error("api error: {0}")]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// The message shown to the shopper. Internals stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingBillingFields(_) => "Please fill all billing details.",
            Self::InvalidAmount(_) => "Invalid payment request. Please check your details.",
            Self::NotLoggedIn => {
                "You must be logged in to checkout. Please log in and try again."
            }
            Self::InvalidCartItems { .. } => {
                "One or more cart items are invalid. Please remove and re-add your products."
            }
            Self::MissingOrderId => "Failed to get payment order id.",
            Self::Gateway(_) | Self::Api(_) => "Failed to initiate payment. Please try again.",
        }
    }
}

/// Observable checkout progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStatus {
    /// Nothing in flight.
    Idle,
    /// Validation and order creation underway.
    Processing,
    /// The widget is open; the order awaits payment and verification.
    PaymentPending,
    /// Payment verified; the order is placed.
    Confirmed,
    /// The widget reported completion but server verification failed.
    VerificationFailed,
    /// Checkout aborted; carries the user-facing message.
    Failed(String),
}

/// Terminal result of a completed checkout call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Payment verified server-side.
    Confirmed,
    /// The widget completed but `/verifypayment` did not accept the
    /// payload. The widget's own UI has told the user the payment state;
    /// the order is not treated as placed.
    VerificationFailed,
}

// =============================================================================
// CheckoutService
// =============================================================================

/// The checkout orchestrator.
pub struct CheckoutService<A: OrdersApi, G: PaymentGateway> {
    api: Arc<A>,
    gateway: G,
    session: SessionStore,
    key: String,
    script_url: String,
    store_name: String,
    theme_color: String,
    status: watch::Sender<CheckoutStatus>,
}

impl<A: OrdersApi, G: PaymentGateway> CheckoutService<A, G> {
    /// Create a checkout service.
    #[must_use]
    pub fn new(
        api: Arc<A>,
        gateway: G,
        session: SessionStore,
        config: &StorefrontConfig,
    ) -> Self {
        let (status, _) = watch::channel(CheckoutStatus::Idle);
        Self {
            api,
            gateway,
            session,
            key: config.razorpay_key.clone(),
            script_url: config.checkout_script_url.clone(),
            store_name: config.store_name.clone(),
            theme_color: config.theme_color.clone(),
            status,
        }
    }

    /// The current checkout status.
    #[must_use]
    pub fn status(&self) -> CheckoutStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutStatus> {
        self.status.subscribe()
    }

    /// Run the whole checkout flow.
    ///
    /// Validation failures abort before any network traffic. On
    /// `Confirmed` the cart is cleared.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`]; [`CheckoutError::user_message`] gives
    /// the display text, which is also published on the status channel.
    #[instrument(skip_all)]
    pub async fn checkout(
        &self,
        cart: &CartStore,
        billing: &BillingDetails,
        totals: Totals,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.status.send_replace(CheckoutStatus::Processing);

        let result = self.run(cart, billing, totals).await;
        match &result {
            Ok(CheckoutOutcome::Confirmed) => {
                self.status.send_replace(CheckoutStatus::Confirmed);
            }
            Ok(CheckoutOutcome::VerificationFailed) => {
                self.status.send_replace(CheckoutStatus::VerificationFailed);
            }
            Err(error) => {
                tracing::error!(%error, "checkout aborted");
                self.status
                    .send_replace(CheckoutStatus::Failed(error.user_message().to_string()));
            }
        }
        result
    }

    async fn run(
        &self,
        cart: &CartStore,
        billing: &BillingDetails,
        totals: Totals,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        // Everything up to the script load is local and must not touch the
        // network when it fails.
        let missing = billing.missing_required_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingBillingFields(missing));
        }

        if totals.total <= Decimal::ZERO {
            return Err(CheckoutError::InvalidAmount(totals.total));
        }

        let token = self
            .session
            .token()
            .filter(|token| token_expiry_valid(token))
            .ok_or(CheckoutError::NotLoggedIn)?;

        let items = build_order_items(&cart.items())?;

        let amount_minor = Price::inr(totals.total)
            .to_minor_units()
            .ok_or(CheckoutError::InvalidAmount(totals.total))?;

        self.gateway.ensure_loaded(&self.script_url).await?;

        let request = CreateOrderRequest {
            address: billing.billing_address.clone(),
            items,
            totals,
            billing: billing.clone(),
        };
        let order_id = self
            .api
            .create_order(&token, &request)
            .await?
            .order_id()
            .ok_or(CheckoutError::MissingOrderId)?;
        tracing::debug!(%order_id, amount_minor, "payment order created");

        let options = WidgetOptions {
            key: self.key.clone(),
            amount: amount_minor.to_string(),
            currency: "INR".to_string(),
            name: self.store_name.clone(),
            description: "Order Payment".to_string(),
            order_id,
            prefill: WidgetPrefill {
                name: billing.billing_customer_name.clone(),
                email: billing.billing_email.clone(),
                contact: billing.billing_phone.clone(),
            },
            notes: WidgetNotes {
                address: billing.billing_address.clone(),
            },
            theme: WidgetTheme {
                color: self.theme_color.clone(),
            },
        };

        self.status.send_replace(CheckoutStatus::PaymentPending);
        let completion = self.gateway.open(options).await?;

        match self
            .api
            .verify_payment(
                &token,
                &VerifyPaymentRequest {
                    razorpay_payment_id: completion.payment_id,
                    razorpay_order_id: completion.order_id,
                    razorpay_signature: completion.signature,
                },
            )
            .await
        {
            Ok(()) => {
                cart.clear();
                tracing::info!("payment verified, order placed");
                Ok(CheckoutOutcome::Confirmed)
            }
            Err(error) => {
                tracing::error!(%error, "payment verification failed");
                Ok(CheckoutOutcome::VerificationFailed)
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Shape cart lines into order items, failing closed if any line has a
/// malformed product id.
fn build_order_items(lines: &[CartItem]) -> Result<Vec<OrderItem>, CheckoutError> {
    let total = lines.len();
    let items: Vec<OrderItem> = lines
        .iter()
        .filter_map(|line| {
            ProductId::parse(&line.id).ok().map(|id| OrderItem {
                id: id.into_inner(),
                title: line.title.clone(),
                category: line.category.clone().unwrap_or_default(),
                size: line.size.clone().unwrap_or_default(),
                price: line.price,
                quantity: line.quantity,
                image: line.image.clone().unwrap_or_default(),
            })
        })
        .collect();

    if items.len() == total {
        Ok(items)
    } else {
        Err(CheckoutError::InvalidCartItems {
            invalid: total - items.len(),
            total,
        })
    }
}

/// Whether a JWT's `exp` claim is in the future.
///
/// Decodes the second dot-separated segment as base64url JSON. Anything
/// that does not decode to a claims object with a future `exp` is invalid.
fn token_expiry_valid(token: &str) -> bool {
    #[derive(Deserialize)]
    struct Claims {
        exp: i64,
    }

    let Some(payload) = token.split('.').nth(1) else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return false;
    };
    let Ok(claims) = serde_json::from_slice::<Claims>(&bytes) else {
        return false;
    };
    claims.exp > Utc::now().timestamp()
}
