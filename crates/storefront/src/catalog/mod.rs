//! Catalog API client.
//!
//! # Architecture
//!
//! - The catalog is the source of truth for names, prices and stock
//! - No local caching: stock must be fresh when a product is added
//! - [`Catalog`] is the seam the purchase flow is generic over, so tests can
//!   substitute an in-process catalog
//!
//! # API
//!
//! - `GET /product/{id}` returns `{ id, name, price, stock, ... }`
//! - `stock = -1` (or `null`) is unlimited, `stock = 0` is out of stock
//!
//! # Example
//!
//! ```rust,ignore
//! use conker_storefront::catalog::{Catalog, CatalogClient};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let product = client.product(&"42".parse()?).await?;
//! ```

mod client;

use std::future::Future;

use conker_core::{Price, ProductId, StockLimit};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::CatalogClient;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with an unexpected status.
    #[error("Catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Product does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured base URL cannot be joined with a product path.
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A product as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub stock: StockLimit,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub needs_license: bool,
    #[serde(default)]
    pub download_link: Option<String>,
}

/// Read-only product lookup.
pub trait Catalog {
    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the product cannot be fetched or parsed.
    fn product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, CatalogError>> + Send;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, CatalogError>> + Send {
        (**self).product(id)
    }
}
