//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts are held in the currency's standard unit (rupees, not paise)
/// using decimal arithmetic. Payment gateways want the smallest currency
/// unit; see [`Price::to_minor_units`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in INR.
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::INR)
    }

    /// Convert to the smallest currency unit (paise for INR), rounding to
    /// the nearest integer with midpoints away from zero.
    ///
    /// Returns `None` if the scaled amount does not fit in an `i64`.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The ISO 4217 code as a string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }

    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_whole() {
        let price = Price::inr(Decimal::new(200, 0));
        assert_eq!(price.to_minor_units(), Some(20000));
    }

    #[test]
    fn test_minor_units_fractional() {
        let price = Price::inr(Decimal::new(19999, 2)); // 199.99
        assert_eq!(price.to_minor_units(), Some(19999));
    }

    #[test]
    fn test_minor_units_rounds_midpoint_up() {
        // 10.005 rupees -> 1000.5 paise -> 1001
        let price = Price::inr(Decimal::new(10005, 3));
        assert_eq!(price.to_minor_units(), Some(1001));
    }

    #[test]
    fn test_minor_units_sub_paise_rounds_down() {
        // 10.004 rupees -> 1000.4 paise -> 1000
        let price = Price::inr(Decimal::new(10004, 3));
        assert_eq!(price.to_minor_units(), Some(1000));
    }

    #[test]
    fn test_currency_code() {
        assert_eq!(CurrencyCode::INR.code(), "INR");
        assert_eq!(CurrencyCode::default(), CurrencyCode::INR);
    }

    #[test]
    fn test_display() {
        let price = Price::inr(Decimal::new(1050, 1)); // 105.0
        assert_eq!(price.to_string(), "₹105.00");
    }
}
