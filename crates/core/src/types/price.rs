//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are never stored as floating point: `4.99 * 2 + 12.99` has to come
//! out as exactly `22.97` on the order summary.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
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

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(cents, 2), currency_code)
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// The price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add an amount in the same currency.
    ///
    /// The catalog only ever holds one currency, so callers add prices that
    /// came from the same place.
    #[must_use]
    pub fn plus(self, amount: Decimal) -> Self {
        Self::new(self.amount + amount, self.currency_code)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_cents() {
        let price = Price::from_cents(500, CurrencyCode::USD);
        assert_eq!(price.display(), "$5.00");
        assert_eq!(price.to_string(), "$5.00");
    }

    #[test]
    fn test_times_is_exact() {
        let tomatoes = Price::from_cents(499, CurrencyCode::USD);
        assert_eq!(tomatoes.times(2).amount, Decimal::new(998, 2));
    }

    #[test]
    fn test_plus_keeps_currency() {
        let price = Price::from_cents(1000, CurrencyCode::EUR).plus(Decimal::new(250, 2));
        assert_eq!(price.currency_code, CurrencyCode::EUR);
        assert_eq!(price.display(), "€12.50");
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_cents(-1, CurrencyCode::USD).is_negative());
        assert!(!Price::zero(CurrencyCode::USD).is_negative());
    }

    #[test]
    fn test_deserialize_from_string_amount() {
        let price: Price = serde_json::from_str(r#"{"amount":"4.99"}"#).unwrap();
        assert_eq!(price, Price::from_cents(499, CurrencyCode::USD));
    }
}
