//! Catalog lookup command.

use std::fmt::Write as _;

use conker_storefront::catalog::{CatalogClient, CatalogProduct};
use conker_storefront::config::StorefrontConfig;
use conker_storefront::error::AppError;
use tracing::info;

use super::{emit, product_id};

/// Human-readable summary of a catalog product.
#[must_use]
pub fn format_product(product: &CatalogProduct) -> String {
    let mut out = format!(
        "{} [{}]\nPrice: {}\nStock: {}",
        product.name, product.id, product.price, product.stock
    );
    if product.stock.is_out_of_stock() {
        out.push_str(" (out of stock)");
    }
    if product.needs_license {
        out.push_str("\nRequires a license key");
    }
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "\n\n{description}");
    }
    out
}

/// Fetch a product from the catalog and print it.
pub async fn show(config: &StorefrontConfig, id: &str) -> Result<(), AppError> {
    let id = product_id(id)?;
    let client = CatalogClient::new(&config.catalog)?;
    let product = client.fetch_product(&id).await?;
    info!(product_id = %product.id, "Fetched product");

    emit(&format_product(&product));
    Ok(())
}
