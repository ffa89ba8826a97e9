//! Stock limits reported by the catalog.
//!
//! On the wire a stock level is an integer: `-1` means unlimited, `0` means
//! out of stock, and any positive number is the purchasable quantity. The
//! catalog database stores untracked stock as `NULL`, which is also unlimited.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Wire value meaning "no stock limit".
pub const UNLIMITED_STOCK: i64 = -1;

/// Errors produced when interpreting a stock value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockLimitError {
    #[error("invalid stock value {0} (expected -1 or a non-negative count)")]
    Invalid(i64),
}

/// Maximum purchasable quantity of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StockLimit {
    #[default]
    Unlimited,
    Limited(u32),
}

impl StockLimit {
    /// Interpret a raw stock value.
    ///
    /// Values above `u32::MAX` are clamped, which is indistinguishable from
    /// unlimited for a cart.
    ///
    /// # Errors
    ///
    /// Returns `StockLimitError::Invalid` for negative values other than `-1`.
    pub fn from_raw(raw: i64) -> Result<Self, StockLimitError> {
        match raw {
            UNLIMITED_STOCK => Ok(Self::Unlimited),
            n if n < 0 => Err(StockLimitError::Invalid(n)),
            n => Ok(Self::Limited(u32::try_from(n).unwrap_or(u32::MAX))),
        }
    }

    /// The wire representation of this limit.
    #[must_use]
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Unlimited => UNLIMITED_STOCK,
            Self::Limited(n) => i64::from(n),
        }
    }

    /// Whether a cart already holding `current` units may take one more.
    #[must_use]
    pub const fn allows_increment(self, current: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(limit) => current < limit,
        }
    }

    #[must_use]
    pub const fn is_out_of_stock(self) -> bool {
        matches!(self, Self::Limited(0))
    }
}

impl fmt::Display for StockLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Limited(n) => write!(f, "{n}"),
        }
    }
}

impl TryFrom<i64> for StockLimit {
    type Error = StockLimitError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl Serialize for StockLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_raw())
    }
}

impl<'de> Deserialize<'de> for StockLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<i64>::deserialize(deserializer)? {
            None => Ok(Self::Unlimited),
            Some(raw) => Self::from_raw(raw).map_err(serde::de::Error::custom),
        }
    }
}
