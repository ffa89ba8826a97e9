//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as JSON numbers (`9.99`) because that is what the catalog API
//! returns and what carts persisted by the browser scripts contain. They are
//! parsed from the number's textual form, never through `f64` arithmetic, so
//! `9.99` stays exactly `9.99`.
//!
//! A price has at most [`MAX_PRICE_SCALE`] decimal places and stays below
//! [`MAX_PRICE_UNITS`] dollars. That keeps it within 15 significant digits,
//! which an `f64` holds exactly and JSON writes in plain (non-exponent)
//! notation, so a saved price always reads back as the same value.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of decimal places used for display and totals.
pub const MONEY_SCALE: u32 = 2;

/// Most decimal places a price may carry.
pub const MAX_PRICE_SCALE: u32 = 4;

/// Exclusive upper bound on a price, in whole dollars.
pub const MAX_PRICE_UNITS: i64 = 100_000_000_000;

/// Errors produced when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must not be negative (got {0})")]
    Negative(Decimal),
    #[error("price must be below 100000000000 (got {0})")]
    TooLarge(Decimal),
    #[error("price has more than 4 decimal places (got {0})")]
    TooPrecise(Decimal),
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative unit price in the shop currency (USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// - `PriceError::Negative` if `amount` is below zero
    /// - `PriceError::TooLarge` if `amount` is [`MAX_PRICE_UNITS`] or more
    /// - `PriceError::TooPrecise` if `amount` has more than
    ///   [`MAX_PRICE_SCALE`] significant decimal places
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        let amount = amount.normalize();
        if amount >= Decimal::from(MAX_PRICE_UNITS) {
            return Err(PriceError::TooLarge(amount));
        }
        if amount.scale() > MAX_PRICE_SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        Ok(Self(amount))
    }

    /// A price of zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity.
    ///
    /// The product is below `MAX_PRICE_UNITS * u32::MAX` (about 4.3e20) with
    /// at most four decimal places, well inside `Decimal`'s range.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format_usd(self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|e| PriceError::Invalid(format!("{trimmed}: {e}")))?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

/// Written as a JSON number; exact because of the range checked in [`Price::new`].
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price out of range"))?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Round an amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as US dollars with two decimal places.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        let result = Price::new(Decimal::new(-1, 2));
        assert!(matches!(result, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_new_accepts_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::zero());
    }

    #[test]
    fn test_deserialize_number_keeps_exact_cents() {
        let price: Price = serde_json::from_str("9.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(999, 2));
    }

    #[test]
    fn test_deserialize_numeric_string() {
        let price: Price = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(price.amount(), Decimal::new(125, 1));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_serialize_as_number() {
        let price = Price::new(Decimal::new(999, 2)).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "9.99");
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(5, 0)).unwrap();
        assert_eq!(price.display(), "$5.00");
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(format_usd(Decimal::new(29_97, 2)), "$29.97");
    }

    #[test]
    fn test_times() {
        let price = Price::new(Decimal::new(250, 2)).unwrap();
        assert_eq!(price.times(3), Decimal::new(750, 2));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(
            Price::new(Decimal::MAX),
            Err(PriceError::TooLarge(_))
        ));
        assert!(matches!(
            Price::new(Decimal::from(MAX_PRICE_UNITS)),
            Err(PriceError::TooLarge(_))
        ));
        assert!(matches!(
            "0.12345678901234567891".parse::<Price>(),
            Err(PriceError::TooPrecise(_))
        ));
        assert!(matches!(
            Price::new(Decimal::new(123_45, 5)),
            Err(PriceError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        let price = Price::new(Decimal::new(9_990_000, 6)).unwrap();
        assert_eq!(price.amount(), Decimal::new(999, 2));
    }

    #[test]
    fn test_json_round_trip_at_bounds() {
        let largest = Decimal::new(99_999_999_999_9999, 4);
        for amount in [largest, Decimal::new(1, 4), Decimal::new(12_3456, 4), Decimal::ZERO] {
            let price = Price::new(amount).unwrap();
            let json = serde_json::to_string(&price).unwrap();
            assert!(!json.contains('e'), "{json} uses exponent notation");
            let restored: Price = serde_json::from_str(&json).unwrap();
            assert_eq!(restored, price, "{json}");
        }
    }
}
