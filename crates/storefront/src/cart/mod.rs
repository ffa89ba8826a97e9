//! Shopping cart aggregate and its persistent store.
//!
//! [`Cart`] is the in-memory value: an ordered list of line items keyed by
//! product id (or by name for legacy entries that were saved without one).
//! [`CartStore`] binds a cart to a [`KeyValueStore`](crate::storage::KeyValueStore)
//! and performs every mutation as load, mutate, write.
//!
//! # Invariants
//!
//! - No two items share a [`LineKey`].
//! - Every item has a quantity of at least 1. Anything that would drop a
//!   quantity to zero removes the item instead.

mod store;

use std::fmt;

use conker_core::{Price, ProductId, StockLimit, price::round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::storage::StorageError;

pub use store::{CART_STORAGE_KEY, CartStore};

/// Errors that can occur when mutating the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product has no stock left.
    #[error("Product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The cart already holds every unit the catalog has.
    #[error("Stock limit of {limit} reached for product {id}")]
    StockLimitReached { id: ProductId, limit: u32 },

    /// The item cannot be stored (e.g., empty name).
    #[error("Invalid cart item: {0}")]
    InvalidItem(String),

    /// The resulting quantity does not fit in a line item.
    #[error("Quantity overflow")]
    QuantityOverflow,

    /// The cart could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CartError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::OutOfStock(_) => "Sorry, this product is out of stock.".to_string(),
            Self::StockLimitReached { .. } => "You've reached the stock limit.".to_string(),
            Self::InvalidItem(reason) => format!("This item can't be added to your cart: {reason}"),
            Self::QuantityOverflow => "That quantity is too large.".to_string(),
            Self::Storage(_) | Self::Serialize(_) => {
                "Your cart could not be saved. Please try again.".to_string()
            }
        }
    }
}

/// Key identifying a line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LineKey {
    /// Item added from the catalog.
    Id(ProductId),
    /// Legacy item persisted without a product id.
    Name(String),
}

impl LineKey {
    /// Short tag for the kind of key, used in rendered markup.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Name(_) => "name",
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<ProductId> for LineKey {
    fn from(id: ProductId) -> Self {
        Self::Id(id)
    }
}

/// A product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl CartItem {
    /// The key this item is looked up by.
    #[must_use]
    pub fn key(&self) -> LineKey {
        self.id
            .clone()
            .map_or_else(|| LineKey::Name(self.name.clone()), LineKey::Id)
    }

    fn matches(&self, key: &LineKey) -> bool {
        match key {
            LineKey::Id(id) => self.id.as_ref() == Some(id),
            LineKey::Name(name) => self.id.is_none() && &self.name == name,
        }
    }

    /// Unit price times quantity, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// Result of [`Cart::change_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The item now has this quantity.
    Updated(u32),
    /// The quantity reached zero and the item was removed.
    Removed,
    /// No item has that key; nothing changed.
    Missing,
}

/// An ordered collection of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items, normalizing as [`Cart::from_json`] does.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.absorb(item);
        }
        cart
    }

    /// Parse a persisted cart, recovering from bad data.
    ///
    /// Text that is not a JSON array yields an empty cart. Entries that fail
    /// to parse, have an empty name or a zero quantity are skipped. Entries
    /// that share a key are merged into the first one.
    #[must_use]
    pub fn from_json(text: &str) -> Self {
        let entries: Vec<serde_json::Value> = match serde_json::from_str(text) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Discarding malformed cart data");
                return Self::new();
            }
        };

        let mut cart = Self::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<CartItem>(entry) {
                Ok(item) => cart.absorb(item),
                Err(e) => warn!(index, error = %e, "Skipping unreadable cart entry"),
            }
        }
        cart
    }

    /// Serialize for persistence.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if a price cannot be represented.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    fn absorb(&mut self, item: CartItem) {
        if item.name.trim().is_empty() {
            warn!(id = ?item.id, "Skipping cart entry without a name");
            return;
        }
        if item.quantity == 0 {
            warn!(name = %item.name, "Skipping cart entry with zero quantity");
            return;
        }

        let key = item.key();
        if let Some(existing) = self.find_mut(&key) {
            warn!(key = %key, "Merging duplicate cart entry");
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Look up an item by key.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    fn find_mut(&mut self, key: &LineKey) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.matches(key))
    }

    /// Add one unit of a product, respecting its stock limit.
    ///
    /// Returns the item's new quantity.
    ///
    /// # Errors
    ///
    /// - `CartError::OutOfStock` if the product is new to the cart and its
    ///   limit is zero.
    /// - `CartError::StockLimitReached` if the cart already holds `limit` units.
    /// - `CartError::InvalidItem` if `name` is blank.
    /// - `CartError::QuantityOverflow` if the quantity cannot grow further.
    pub fn add_or_increment(
        &mut self,
        id: ProductId,
        name: &str,
        price: Price,
        stock: StockLimit,
    ) -> Result<u32, CartError> {
        let key = LineKey::Id(id.clone());

        if let Some(existing) = self.find_mut(&key) {
            if !stock.allows_increment(existing.quantity) {
                return Err(match stock {
                    StockLimit::Limited(limit) if limit > 0 => {
                        CartError::StockLimitReached { id, limit }
                    }
                    _ => CartError::OutOfStock(id),
                });
            }
            existing.quantity = existing
                .quantity
                .checked_add(1)
                .ok_or(CartError::QuantityOverflow)?;
            return Ok(existing.quantity);
        }

        if name.trim().is_empty() {
            return Err(CartError::InvalidItem("name must not be empty".to_string()));
        }
        if !stock.allows_increment(0) {
            return Err(CartError::OutOfStock(id));
        }

        self.items.push(CartItem {
            id: Some(id),
            name: name.trim().to_string(),
            price,
            quantity: 1,
        });
        Ok(1)
    }

    /// Adjust an item's quantity by `delta`, removing it at zero or below.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityOverflow` if the result exceeds `u32::MAX`.
    pub fn change_quantity(
        &mut self,
        key: &LineKey,
        delta: i64,
    ) -> Result<QuantityChange, CartError> {
        let Some(position) = self.items.iter().position(|item| item.matches(key)) else {
            return Ok(QuantityChange::Missing);
        };
        let Some(item) = self.items.get_mut(position) else {
            return Ok(QuantityChange::Missing);
        };

        let next = i64::from(item.quantity).saturating_add(delta);
        if next <= 0 {
            self.items.remove(position);
            return Ok(QuantityChange::Removed);
        }

        item.quantity = u32::try_from(next).map_err(|_| CartError::QuantityOverflow)?;
        Ok(QuantityChange::Updated(item.quantity))
    }

    /// Add `count` units to an existing product line, respecting its stock
    /// limit. A product not in the cart is left out (`Missing`).
    ///
    /// # Errors
    ///
    /// - `CartError::OutOfStock` if the limit is zero.
    /// - `CartError::StockLimitReached` if the new quantity would exceed the
    ///   limit; the line keeps its quantity.
    /// - `CartError::QuantityOverflow` if the result exceeds `u32::MAX`.
    pub fn increase(
        &mut self,
        id: &ProductId,
        count: u32,
        stock: StockLimit,
    ) -> Result<QuantityChange, CartError> {
        let Some(item) = self.find_mut(&LineKey::Id(id.clone())) else {
            return Ok(QuantityChange::Missing);
        };

        let next = item
            .quantity
            .checked_add(count)
            .ok_or(CartError::QuantityOverflow)?;
        match stock {
            StockLimit::Limited(0) => return Err(CartError::OutOfStock(id.clone())),
            StockLimit::Limited(limit) if next > limit => {
                return Err(CartError::StockLimitReached {
                    id: id.clone(),
                    limit,
                });
            }
            _ => {}
        }

        item.quantity = next;
        Ok(QuantityChange::Updated(next))
    }

    /// Remove an item. Returns whether anything was removed.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.matches(key));
        self.items.len() < before
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line totals, rounded to cents.
    ///
    /// A line total is below 4.3e20 (see [`Price::times`]), so the sum stays
    /// inside `Decimal`'s 7.9e28 range for any cart under 10^8 lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        round_money(self.items.iter().map(CartItem::line_total).sum())
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).unwrap()
    }

    fn item(id: &str, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id: Some(pid(id)),
            name: format!("Product {id}"),
            price: price(cents),
            quantity,
        }
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = Cart::new();
        let qty = cart
            .add_or_increment(pid("p1"), "Widget", price(999), StockLimit::Unlimited)
            .unwrap();

        assert_eq!(qty, 1);
        assert_eq!(
            cart.items(),
            &[CartItem {
                id: Some(pid("p1")),
                name: "Widget".to_string(),
                price: price(999),
                quantity: 1,
            }]
        );
        assert_eq!(cart.total(), Decimal::new(999, 2));
    }

    #[test]
    fn test_add_existing_increments() {
        let mut cart = Cart::from_items([item("p1", 100, 1)]);
        let qty = cart
            .add_or_increment(pid("p1"), "ignored", price(100), StockLimit::Unlimited)
            .unwrap();
        assert_eq!(qty, 2);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_rejects_when_limit_reached() {
        let mut cart = Cart::from_items([item("p1", 200, 3)]);
        let err = cart
            .add_or_increment(pid("p1"), "Product p1", price(200), StockLimit::Limited(3))
            .unwrap_err();

        assert!(matches!(err, CartError::StockLimitReached { limit: 3, .. }));
        assert_eq!(cart.get(&pid("p1").into()).unwrap().quantity, 3);
    }

    #[test]
    fn test_add_rejects_zero_stock_for_new_item() {
        let mut cart = Cart::new();
        let err = cart
            .add_or_increment(pid("p1"), "Widget", price(100), StockLimit::Limited(0))
            .unwrap_err();
        assert!(matches!(err, CartError::OutOfStock(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_zero_stock_for_existing_item() {
        let mut cart = Cart::from_items([item("p1", 100, 2)]);
        let err = cart
            .add_or_increment(pid("p1"), "Product p1", price(100), StockLimit::Limited(0))
            .unwrap_err();
        assert!(matches!(err, CartError::OutOfStock(_)));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_unlimited_never_rejects() {
        let mut cart = Cart::from_items([item("p1", 100, u32::MAX - 1)]);
        let qty = cart
            .add_or_increment(pid("p1"), "Product p1", price(100), StockLimit::Unlimited)
            .unwrap();
        assert_eq!(qty, u32::MAX);
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut cart = Cart::new();
        let err = cart
            .add_or_increment(pid("p1"), "  ", price(100), StockLimit::Unlimited)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidItem(_)));
    }

    #[test]
    fn test_decrement_to_zero_removes() {
        let mut cart = Cart::from_items([item("p1", 500, 2)]);
        let key = LineKey::from(pid("p1"));

        assert_eq!(
            cart.change_quantity(&key, -1).unwrap(),
            QuantityChange::Updated(1)
        );
        assert_eq!(cart.total(), Decimal::new(500, 2));

        assert_eq!(
            cart.change_quantity(&key, -1).unwrap(),
            QuantityChange::Removed
        );
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_large_negative_delta_removes() {
        let mut cart = Cart::from_items([item("p1", 100, 2)]);
        assert_eq!(
            cart.change_quantity(&pid("p1").into(), i64::MIN).unwrap(),
            QuantityChange::Removed
        );
    }

    #[test]
    fn test_change_quantity_overflow() {
        let mut cart = Cart::from_items([item("p1", 100, 2)]);
        let err = cart
            .change_quantity(&pid("p1").into(), i64::from(u32::MAX))
            .unwrap_err();
        assert!(matches!(err, CartError::QuantityOverflow));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_change_quantity_missing_key() {
        let mut cart = Cart::from_items([item("p1", 100, 1)]);
        assert_eq!(
            cart.change_quantity(&pid("nope").into(), 1).unwrap(),
            QuantityChange::Missing
        );
    }

    #[test]
    fn test_increase_within_limit() {
        let mut cart = Cart::from_items([item("p1", 100, 1)]);
        assert_eq!(
            cart.increase(&pid("p1"), 2, StockLimit::Limited(3)).unwrap(),
            QuantityChange::Updated(3)
        );
    }

    #[test]
    fn test_increase_past_limit_rejected() {
        let mut cart = Cart::from_items([item("p1", 100, 1)]);
        let err = cart
            .increase(&pid("p1"), 100, StockLimit::Limited(2))
            .unwrap_err();
        assert!(matches!(err, CartError::StockLimitReached { limit: 2, .. }));
        assert_eq!(cart.get(&pid("p1").into()).unwrap().quantity, 1);

        let err = cart
            .increase(&pid("p1"), 1, StockLimit::Limited(0))
            .unwrap_err();
        assert!(matches!(err, CartError::OutOfStock(_)));
    }

    #[test]
    fn test_increase_missing_line() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.increase(&pid("p1"), 1, StockLimit::Unlimited).unwrap(),
            QuantityChange::Missing
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_at_price_bound() {
        let top = Price::new(Decimal::new(99_999_999_999_9999, 4)).unwrap();
        let cart = Cart::from_items([CartItem {
            id: Some(pid("p1")),
            name: "Top".to_string(),
            price: top,
            quantity: u32::MAX,
        }]);
        assert_eq!(
            cart.total(),
            round_money(top.amount() * Decimal::from(u32::MAX))
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::from_items([item("p1", 100, 1), item("p2", 200, 1)]);
        let key = LineKey::from(pid("p1"));

        assert!(cart.remove(&key));
        let once = cart.clone();
        assert!(!cart.remove(&key));
        assert_eq!(cart, once);
    }

    #[test]
    fn test_total_sums_line_totals() {
        let cart = Cart::from_items([item("p1", 999, 3), item("p2", 1, 1)]);
        assert_eq!(cart.total(), Decimal::new(2998, 2));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_from_json_malformed_is_empty() {
        assert!(Cart::from_json("{not json").is_empty());
        assert!(Cart::from_json("{\"id\": 1}").is_empty());
        assert_eq!(Cart::from_json("null").total(), Decimal::ZERO);
    }

    #[test]
    fn test_from_json_skips_bad_entries_and_merges_duplicates() {
        let text = r#"[
            {"id": 1, "name": "Tweak", "price": 4.5, "quantity": 1},
            {"id": 2, "name": "", "price": 1, "quantity": 1},
            {"id": 3, "name": "Zero", "price": 1, "quantity": 0},
            {"id": 4, "name": "Negative", "price": 1, "quantity": -2},
            {"id": "1", "name": "Tweak", "price": 4.5, "quantity": 2},
            {"name": "Legacy", "price": "3.00", "quantity": 1}
        ]"#;
        let cart = Cart::from_json(text);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(&pid("1").into()).unwrap().quantity, 3);
        assert!(cart.get(&LineKey::Name("Legacy".to_string())).is_some());
    }

    #[test]
    fn test_json_round_trip() {
        let cart = Cart::from_items([
            item("p1", 999, 2),
            CartItem {
                id: None,
                name: "Legacy".to_string(),
                price: price(300),
                quantity: 1,
            },
        ]);
        let restored = Cart::from_json(&cart.to_json().unwrap());
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_name_key_does_not_match_id_items() {
        let cart = Cart::from_items([item("p1", 100, 1)]);
        assert!(cart.get(&LineKey::Name("Product p1".to_string())).is_none());
    }

    #[test]
    fn test_quantities_stay_positive_over_mixed_operations() {
        let mut cart = Cart::new();
        let ops: [(&str, i64); 8] = [
            ("a", 0),
            ("b", 0),
            ("a", -1),
            ("b", 3),
            ("b", -5),
            ("a", 0),
            ("a", 2),
            ("c", -1),
        ];
        for (id, delta) in ops {
            if delta == 0 {
                cart.add_or_increment(pid(id), id, price(100), StockLimit::Limited(2))
                    .ok();
            } else {
                cart.change_quantity(&pid(id).into(), delta).unwrap();
            }
            assert!(cart.items().iter().all(|item| item.quantity >= 1));
        }
        assert_eq!(cart.get(&pid("a").into()).unwrap().quantity, 3);
    }
}
