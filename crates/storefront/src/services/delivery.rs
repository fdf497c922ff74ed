//! Delivery cost lookup.
//!
//! Quotes are fetched as the shopper types a destination pincode, so
//! responses can land out of order. Each request takes a ticket from a
//! monotonically increasing sequence and only the latest ticket's response
//! is surfaced; everything older reports as stale.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use tracing::instrument;

use dreamx_core::Pincode;

use crate::api::OrdersApi;
use crate::api::types::DeliveryPriceRequest;
use crate::models::{CartItem, DeliveryQuote};

/// Fallback origin pincode when no cart line names a pickup location.
const DEFAULT_ORIGIN: &str = "560066";

/// Result of a delivery quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    /// The destination is not a complete pincode yet; nothing was fetched.
    Skipped,
    /// A newer request superseded this one while it was in flight.
    Stale,
    /// The quote for the destination.
    Quoted(DeliveryQuote),
    /// The lookup failed; carries the user-facing message.
    Failed(String),
}

impl QuoteOutcome {
    /// The shipping charge to apply: the quoted cost for a hit, zero for
    /// everything else.
    #[must_use]
    pub fn charge(&self) -> Decimal {
        match self {
            Self::Quoted(quote) => quote.charge,
            Self::Skipped | Self::Stale | Self::Failed(_) => Decimal::ZERO,
        }
    }
}

/// Delivery quote lookup with last-write-wins sequencing.
pub struct DeliveryQuoteService<A: OrdersApi> {
    api: Arc<A>,
    seq: AtomicU64,
}

impl<A: OrdersApi> DeliveryQuoteService<A> {
    /// Create a quote service.
    #[must_use]
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            seq: AtomicU64::new(0),
        }
    }

    /// Fetch a delivery quote for `destination`.
    ///
    /// Returns [`QuoteOutcome::Skipped`] until the destination is a full
    /// six-digit pincode. The origin is the first cart line's pickup
    /// pincode; a cart whose first line has none uses the warehouse
    /// default, even if a later line carries one.
    #[instrument(skip(self, cart))]
    pub async fn quote(&self, cart: &[CartItem], destination: &str) -> QuoteOutcome {
        let Ok(destination) = Pincode::parse(destination) else {
            return QuoteOutcome::Skipped;
        };

        let origin = cart
            .first()
            .and_then(|line| line.pickup_pincode.as_deref())
            .unwrap_or(DEFAULT_ORIGIN)
            .to_owned();

        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self
            .api
            .delivery_price(&DeliveryPriceRequest {
                pickup_postcode: origin,
                delivery_postcode: destination.as_str().to_owned(),
            })
            .await;

        // A later call has already taken a newer ticket; this response
        // must not clobber its quote.
        if self.seq.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, "discarding stale delivery quote");
            return QuoteOutcome::Stale;
        }

        match result {
            Ok(response) => QuoteOutcome::Quoted(DeliveryQuote {
                charge: response.delivery_cost,
                estimated_days: response.estimated_days(),
            }),
            Err(error) => {
                tracing::warn!(%error, "delivery quote lookup failed");
                QuoteOutcome::Failed(
                    "Could not fetch delivery info for this pin.".to_string(),
                )
            }
        }
    }
}
