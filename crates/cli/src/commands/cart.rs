//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! conker cart add 3
//! conker cart show --html
//! conker cart change 3 -2
//! ```

use std::fmt::Write as _;

use conker_core::price::format_usd;
use conker_storefront::cart::QuantityChange;
use conker_storefront::error::AppError;
use conker_storefront::views::{self, CartView};
use tracing::instrument;

use super::{Context, emit, line_key, product_id};

/// Plain-text rendering of a cart view.
#[must_use]
pub fn format_cart(cart: &CartView) -> String {
    if cart.is_empty() {
        return format!("Your cart is empty.\nTotal: {}", format_usd(cart.total));
    }

    let mut out = String::new();
    for item in &cart.items {
        let _ = writeln!(
            out,
            "{:>4} x {:<32} {:>10}  [{}: {}]",
            item.quantity,
            item.name,
            format_usd(item.line_total),
            item.key_kind,
            item.key
        );
    }
    let _ = write!(
        out,
        "Total: {} ({} item{})",
        format_usd(cart.total),
        cart.item_count,
        if cart.item_count == 1 { "" } else { "s" }
    );
    out
}

fn describe_change(key: &str, change: QuantityChange) -> String {
    match change {
        QuantityChange::Updated(quantity) => format!("{key}: quantity is now {quantity}"),
        QuantityChange::Removed => format!("{key}: removed from cart"),
        QuantityChange::Missing => format!("{key}: not in cart"),
    }
}

/// Show the cart as text or as the checkout HTML fragment.
pub fn show(ctx: &Context, html: bool) -> Result<(), AppError> {
    let view = ctx.cart().view();
    if html {
        emit(&views::render_cart_items(&view)?);
        emit(&views::render_cart_count(view.item_count)?);
    } else {
        emit(&format_cart(&view));
    }
    Ok(())
}

/// Add one unit of a product through the catalog-verified path.
#[instrument(skip(ctx))]
pub async fn add(ctx: &Context, id: &str) -> Result<(), AppError> {
    let id = product_id(id)?;
    let added = ctx.flow.add_product(&id).await?;
    emit(&format!(
        "Added {} ({}), quantity {}. Cart total: {}",
        added.product.name,
        added.product.price,
        added.quantity,
        format_usd(ctx.cart().total())
    ));
    Ok(())
}

/// Add one more unit of an existing line, re-checking stock.
pub async fn increment(ctx: &Context, key: &str, by_name: bool) -> Result<(), AppError> {
    let key = line_key(key, by_name)?;
    let added = ctx.flow.increment(&key).await?;
    emit(&describe_change(
        &key.to_string(),
        QuantityChange::Updated(added.quantity),
    ));
    Ok(())
}

/// Remove one unit of a line.
pub fn decrement(ctx: &Context, key: &str, by_name: bool) -> Result<(), AppError> {
    let key = line_key(key, by_name)?;
    let change = ctx.flow.decrement(&key)?;
    emit(&describe_change(&key.to_string(), change));
    Ok(())
}

/// Change a line's quantity by `delta`, re-checking stock when it grows.
pub async fn change(ctx: &Context, key: &str, delta: i64, by_name: bool) -> Result<(), AppError> {
    let key = line_key(key, by_name)?;
    let change = ctx.flow.change_quantity(&key, delta).await?;
    emit(&describe_change(&key.to_string(), change));
    Ok(())
}

/// Remove a line.
pub fn remove(ctx: &Context, key: &str, by_name: bool) -> Result<(), AppError> {
    let key = line_key(key, by_name)?;
    let removed = ctx.cart().remove(&key)?;
    let change = if removed {
        QuantityChange::Removed
    } else {
        QuantityChange::Missing
    };
    emit(&describe_change(&key.to_string(), change));
    Ok(())
}

/// Empty the cart.
pub fn clear(ctx: &Context) -> Result<(), AppError> {
    ctx.cart().clear()?;
    emit("Cart cleared.");
    Ok(())
}

/// Print the cart total.
pub fn total(ctx: &Context) {
    emit(&format_usd(ctx.cart().total()));
}
