//! CLI command implementations.

pub mod cart;
pub mod product;

use conker_storefront::cart::{CartStore, LineKey};
use conker_storefront::catalog::CatalogClient;
use conker_storefront::config::StorefrontConfig;
use conker_storefront::error::AppError;
use conker_storefront::purchase::PurchaseFlow;
use conker_storefront::storage::FileStore;

use conker_core::ProductId;

/// Everything a cart command needs: the file-backed cart and the catalog.
pub struct Context {
    pub flow: PurchaseFlow<CatalogClient, FileStore>,
}

impl Context {
    /// Open the cart directory and build the catalog client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the cart directory cannot be created, or
    /// `AppError::Catalog` if the HTTP client cannot be built.
    pub fn open(config: &StorefrontConfig) -> Result<Self, AppError> {
        let storage = FileStore::open(&config.cart_dir)?;
        let catalog = CatalogClient::new(&config.catalog)?;
        Ok(Self {
            flow: PurchaseFlow::new(catalog, CartStore::new(storage)),
        })
    }

    /// The persisted cart.
    pub fn cart(&self) -> &CartStore<FileStore> {
        self.flow.cart()
    }
}

/// Write a line of command output to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(text: &str) {
    println!("{text}");
}

/// Parse a product id argument.
pub fn product_id(raw: &str) -> Result<ProductId, AppError> {
    ProductId::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid product id: {e}")))
}

/// Parse a line key argument.
pub fn line_key(raw: &str, by_name: bool) -> Result<LineKey, AppError> {
    if by_name {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Item name must not be empty".to_string()));
        }
        return Ok(LineKey::Name(name.to_string()));
    }
    product_id(raw).map(LineKey::Id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_key_by_id() {
        assert_eq!(
            line_key(" 42 ", false).unwrap(),
            LineKey::Id(ProductId::from(42_i64))
        );
    }

    #[test]
    fn test_line_key_by_name() {
        assert_eq!(
            line_key("Old Item", true).unwrap(),
            LineKey::Name("Old Item".to_string())
        );
    }

    #[test]
    fn test_line_key_rejects_blank() {
        assert!(matches!(line_key(" ", false), Err(AppError::BadRequest(_))));
        assert!(matches!(line_key(" ", true), Err(AppError::BadRequest(_))));
    }
}
