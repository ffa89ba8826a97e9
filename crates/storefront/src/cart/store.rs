//! Cart persistence.
//!
//! The store holds no cart of its own: every call reads the latest persisted
//! cart, so a mutation that lands after a slow catalog lookup still applies to
//! whatever an earlier mutation wrote. Each mutation ends with exactly one
//! full-cart write.

use conker_core::{Price, ProductId, StockLimit};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use super::{Cart, CartError, LineKey, QuantityChange};
use crate::storage::KeyValueStore;
use crate::views::CartView;

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// A cart persisted in a key/value store.
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    storage: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a cart store over the given storage.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the persisted cart.
    ///
    /// Never fails: missing, unreadable or malformed data yields an empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        match self.storage.get_item(CART_STORAGE_KEY) {
            Ok(Some(text)) => Cart::from_json(&text),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart from storage");
                Cart::new()
            }
        }
    }

    /// Persist a cart, replacing whatever is stored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Serialize` or `CartError::Storage` if the write fails.
    pub fn save(&self, cart: &Cart) -> Result<(), CartError> {
        let text = cart.to_json()?;
        self.storage.set_item(CART_STORAGE_KEY, &text)?;
        debug!(items = cart.len(), "Cart saved");
        Ok(())
    }

    /// Add one unit of a product, or reject it against the stock limit.
    ///
    /// Returns the product's new quantity. A rejected call leaves storage
    /// untouched.
    ///
    /// # Errors
    ///
    /// See [`Cart::add_or_increment`]; additionally `CartError::Storage` if
    /// the updated cart cannot be written.
    #[instrument(skip(self, name, price), fields(product_id = %id))]
    pub fn add_or_increment(
        &self,
        id: ProductId,
        name: &str,
        price: Price,
        stock: StockLimit,
    ) -> Result<u32, CartError> {
        let mut cart = self.load();
        let quantity = cart.add_or_increment(id, name, price, stock)?;
        self.save(&cart)?;
        info!(quantity, "Added to cart");
        Ok(quantity)
    }

    /// Adjust the quantity of an item by `delta`.
    ///
    /// # Errors
    ///
    /// See [`Cart::change_quantity`]; additionally `CartError::Storage` if
    /// the updated cart cannot be written.
    #[instrument(skip(self, key), fields(key = %key))]
    pub fn change_quantity(&self, key: &LineKey, delta: i64) -> Result<QuantityChange, CartError> {
        let mut cart = self.load();
        let change = cart.change_quantity(key, delta)?;
        if change != QuantityChange::Missing {
            self.save(&cart)?;
        }
        debug!(?change, "Quantity changed");
        Ok(change)
    }

    /// Add `count` units to a product line already in the cart, checked
    /// against `stock`.
    ///
    /// # Errors
    ///
    /// See [`Cart::increase`]; additionally `CartError::Storage` if the
    /// updated cart cannot be written.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn increase(
        &self,
        id: &ProductId,
        count: u32,
        stock: StockLimit,
    ) -> Result<QuantityChange, CartError> {
        let mut cart = self.load();
        let change = cart.increase(id, count, stock)?;
        if change != QuantityChange::Missing {
            self.save(&cart)?;
        }
        debug!(?change, "Quantity increased");
        Ok(change)
    }

    /// Remove an item. Removing an absent item is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the updated cart cannot be written.
    #[instrument(skip(self, key), fields(key = %key))]
    pub fn remove(&self, key: &LineKey) -> Result<bool, CartError> {
        let mut cart = self.load();
        let removed = cart.remove(key);
        if removed {
            self.save(&cart)?;
        }
        Ok(removed)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the empty cart cannot be written.
    pub fn clear(&self) -> Result<(), CartError> {
        self.save(&Cart::new())?;
        info!("Cart cleared");
        Ok(())
    }

    /// Grand total of the persisted cart, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.load().total()
    }

    /// Total number of units in the persisted cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.load().item_count()
    }

    /// View model of the persisted cart.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::from(&self.load())
    }
}
