//! Integration tests for the Conker storefront cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p conker-integration-tests
//! ```
//!
//! The catalog is served by a local `mockito` server and the cart is persisted
//! to a temporary directory, so the tests need no network or fixtures.
//!
//! # Test Categories
//!
//! - `cart_flow` - catalog-verified additions through to the rendered checkout
//! - `cart_persistence` - what survives on disk between sessions

use conker_storefront::cart::CartStore;
use conker_storefront::catalog::CatalogClient;
use conker_storefront::config::StorefrontConfig;
use conker_storefront::purchase::PurchaseFlow;
use conker_storefront::storage::FileStore;
use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;

/// A mock catalog server plus a scratch cart directory.
pub struct TestContext {
    pub server: ServerGuard,
    pub cart_dir: TempDir,
}

impl TestContext {
    /// Start a catalog server and create an empty cart directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let cart_dir = tempfile::tempdir().expect("create cart dir");
        Self { server, cart_dir }
    }

    /// Configuration pointing at the mock catalog and the scratch directory.
    ///
    /// # Panics
    ///
    /// Panics if the generated configuration is rejected.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let api_url = self.server.url();
        let cart_dir = self.cart_dir.path().to_string_lossy().into_owned();
        StorefrontConfig::from_lookup(|key| match key {
            "CONKER_API_URL" => Some(api_url.clone()),
            "CONKER_CART_DIR" => Some(cart_dir.clone()),
            "CONKER_HTTP_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .expect("valid test configuration")
    }

    /// A fresh purchase flow over the on-disk cart.
    ///
    /// Each call opens its own store, as a new page load would.
    ///
    /// # Panics
    ///
    /// Panics if the store or client cannot be built.
    #[must_use]
    pub fn flow(&self) -> PurchaseFlow<CatalogClient, FileStore> {
        let config = self.config();
        let storage = FileStore::open(&config.cart_dir).expect("open cart dir");
        let catalog = CatalogClient::new(&config.catalog).expect("build catalog client");
        PurchaseFlow::new(catalog, CartStore::new(storage))
    }

    /// Serve `body` as `GET /product/{id}`.
    pub async fn mock_product(&mut self, id: &str, body: serde_json::Value) -> Mock {
        self.server
            .mock("GET", format!("/product/{id}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Answer `GET /product/{id}` with a bare status.
    pub async fn mock_status(&mut self, id: &str, status: usize) -> Mock {
        self.server
            .mock("GET", format!("/product/{id}").as_str())
            .with_status(status)
            .create_async()
            .await
    }

    /// Path of the persisted cart file.
    #[must_use]
    pub fn cart_file(&self) -> std::path::PathBuf {
        self.cart_dir.path().join("cart.json")
    }
}
