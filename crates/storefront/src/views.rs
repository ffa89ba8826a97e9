//! Checkout view models and templates.
//!
//! [`CartView`] is a pure projection of a [`Cart`]; building it touches no
//! storage, so it can be tested on its own. The templates render it with
//! Askama's HTML escaping, which covers every interpolated value including
//! the line keys placed in `data-*` attributes.

use askama::Template;
use rust_decimal::Decimal;

use crate::cart::{Cart, CartItem};
use crate::filters;

/// Cart line display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub key: String,
    pub key_kind: &'static str,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Decimal,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let key = item.key();
        Self {
            key: key.to_string(),
            key_kind: key.kind(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.price.amount(),
            line_total: conker_core::price::round_money(item.line_total()),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

/// Cart items fragment: one row per line plus the grand total.
#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<div id="checkout-products" class="checkout-list">
{%- if cart.items.is_empty() %}
  <p id="empty-cart-message">Your cart is empty.</p>
{%- else %}
{%- for item in cart.items %}
  <div class="checkout-item" data-key="{{ item.key }}" data-key-kind="{{ item.key_kind }}">
    <span class="item-name">{{ item.name }}</span>
    <div class="quantity-controls">
      <button type="button" class="qty-btn decrease" data-delta="-1">-</button>
      <span class="qty-number">{{ item.quantity }}</span>
      <button type="button" class="qty-btn increase" data-delta="1">+</button>
    </div>
    <span class="item-price">{{ item.line_total|usd }}</span>
  </div>
{%- endfor %}
{%- endif %}
</div>
<p class="cart-total">Total: <span id="cart-total">{{ cart.total|usd }}</span></p>
"#
)]
pub struct CartItemsTemplate<'a> {
    pub cart: &'a CartView,
}

/// Cart count badge fragment.
#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<span id="cart-count" class="cart-count">{{ count }}</span>"#
)]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Render the cart items fragment.
///
/// # Errors
///
/// Returns `askama::Error` if rendering fails.
pub fn render_cart_items(cart: &CartView) -> askama::Result<String> {
    CartItemsTemplate { cart }.render()
}

/// Render the cart count badge.
///
/// # Errors
///
/// Returns `askama::Error` if rendering fails.
pub fn render_cart_count(count: u64) -> askama::Result<String> {
    CartCountTemplate { count }.render()
}
