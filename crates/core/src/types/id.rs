//! Catalog product identifiers.
//!
//! The catalog database keys products by integer, while carts written by older
//! storefront scripts may hold the id as either a JSON number or a string.
//! [`ProductId`] accepts both on the way in and always compares as text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors produced when parsing a [`ProductId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductIdError {
    #[error("product id must not be empty")]
    Empty,
    #[error("product id contains control characters")]
    ControlCharacter,
}

/// Identifier of a product in the catalog.
///
/// # Example
///
/// ```rust
/// # use conker_core::ProductId;
/// let from_text: ProductId = "42".parse().unwrap();
/// let from_number = ProductId::from(42_i64);
/// assert_eq!(from_text, from_number);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Parse a product id, rejecting empty or control-character input.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `ProductIdError` if the trimmed value is empty or contains
    /// control characters.
    pub fn parse(value: &str) -> Result<Self, ProductIdError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ProductIdError::Empty);
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ProductIdError::ControlCharacter);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Integer(id) => Ok(Self::from(id)),
            Raw::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}
