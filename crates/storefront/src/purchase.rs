//! Catalog-verified cart additions.
//!
//! Every path that grows the cart goes through [`PurchaseFlow`]: the product
//! is looked up first, and only a successful lookup reaches the cart store.
//! A failed lookup fails closed, leaving the cart as it was.

use conker_core::ProductId;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::cart::{CartError, CartStore, LineKey, QuantityChange};
use crate::catalog::{Catalog, CatalogError, CatalogProduct};
use crate::storage::KeyValueStore;

/// Errors that can occur when adding to the cart.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// Availability could not be verified with the catalog.
    #[error("Unable to verify availability: {0}")]
    Unavailable(#[from] CatalogError),

    /// The line has no product id, so it cannot be checked against the catalog.
    #[error("Cannot verify stock for item without a product id: {0}")]
    Unverifiable(String),

    /// The cart rejected the addition.
    #[error(transparent)]
    Cart(#[from] CartError),
}

impl PurchaseError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unavailable(CatalogError::NotFound(_)) => {
                "This product is no longer available.".to_string()
            }
            Self::Unavailable(_) => "Unable to verify availability. Please try again.".to_string(),
            Self::Unverifiable(_) => {
                "This item can't be checked for availability. Remove it and add it again from the store."
                    .to_string()
            }
            Self::Cart(err) => err.user_message(),
        }
    }
}

/// Result of a successful addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub product: CatalogProduct,
    pub quantity: u32,
}

/// Cart operations backed by a catalog.
#[derive(Debug, Clone)]
pub struct PurchaseFlow<C, S> {
    catalog: C,
    cart: CartStore<S>,
}

impl<C: Catalog, S: KeyValueStore> PurchaseFlow<C, S> {
    /// Create a purchase flow.
    #[must_use]
    pub const fn new(catalog: C, cart: CartStore<S>) -> Self {
        Self { catalog, cart }
    }

    /// The cart store this flow writes to.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    /// The catalog this flow reads from.
    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Add one unit of a product after checking its stock with the catalog.
    ///
    /// # Errors
    ///
    /// - `PurchaseError::Unavailable` if the catalog lookup fails
    /// - `PurchaseError::Cart` if the stock limit rejects the addition or the
    ///   cart cannot be written
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_product(&self, id: &ProductId) -> Result<Added, PurchaseError> {
        let product = self.lookup(id).await?;

        // The catalog's id is canonical (e.g., integer ids echoed back as numbers)
        let quantity = self.cart.add_or_increment(
            product.id.clone(),
            &product.name,
            product.price,
            product.stock,
        )?;

        info!(quantity, stock = %product.stock, "Product added");
        Ok(Added { product, quantity })
    }

    /// Increment a line, re-checking stock when the line has a product id.
    ///
    /// # Errors
    ///
    /// - `PurchaseError::Unverifiable` for lines keyed by name
    /// - otherwise as [`PurchaseFlow::add_product`]
    pub async fn increment(&self, key: &LineKey) -> Result<Added, PurchaseError> {
        match key {
            LineKey::Id(id) => self.add_product(id).await,
            LineKey::Name(name) => Err(PurchaseError::Unverifiable(name.clone())),
        }
    }

    /// Change a line's quantity by `delta`.
    ///
    /// A positive delta grows the cart, so it is checked against the
    /// catalog's stock first, like [`PurchaseFlow::add_product`]. Zero or a
    /// negative delta goes straight to the cart, removing the line at zero.
    ///
    /// # Errors
    ///
    /// - `PurchaseError::Unverifiable` for a positive delta on a name-keyed line
    /// - `PurchaseError::Unavailable` if the catalog lookup fails
    /// - `PurchaseError::Cart` if the stock limit rejects the change or the
    ///   cart cannot be written
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn change_quantity(
        &self,
        key: &LineKey,
        delta: i64,
    ) -> Result<QuantityChange, PurchaseError> {
        if delta <= 0 {
            return Ok(self.cart.change_quantity(key, delta)?);
        }
        let id = match key {
            LineKey::Id(id) => id,
            LineKey::Name(name) => return Err(PurchaseError::Unverifiable(name.clone())),
        };
        let count = u32::try_from(delta).map_err(|_| CartError::QuantityOverflow)?;

        if self.cart.load().get(key).is_none() {
            return Ok(QuantityChange::Missing);
        }

        let product = self.lookup(id).await?;
        Ok(self.cart.increase(id, count, product.stock)?)
    }

    async fn lookup(&self, id: &ProductId) -> Result<CatalogProduct, PurchaseError> {
        Ok(self
            .catalog
            .product(id)
            .await
            .inspect_err(|e| warn!(error = %e, "Catalog lookup failed; not changing cart"))?)
    }

    /// Decrement a line, removing it when the quantity reaches zero.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseError::Cart` if the cart cannot be written.
    pub fn decrement(&self, key: &LineKey) -> Result<QuantityChange, PurchaseError> {
        Ok(self.cart.change_quantity(key, -1)?)
    }
}
