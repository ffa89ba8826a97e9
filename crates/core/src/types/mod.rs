//! Core types for the Conker storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod stock;

pub use id::{ProductId, ProductIdError};
pub use price::{Price, PriceError};
pub use stock::{StockLimit, StockLimitError};
