//! Conker Storefront library.
//!
//! The client-side half of the storefront: a shopping cart persisted in
//! local key/value storage, a client for the catalog REST API, and the
//! templates the checkout page is rendered from.
//!
//! # Architecture
//!
//! - [`storage`] - `localStorage`-style key/value seam with memory and file backends
//! - [`cart`] - cart aggregate and the store that persists it
//! - [`catalog`] - product lookup against the catalog API
//! - [`purchase`] - catalog-verified additions (fail-closed)
//! - [`views`] - pure view models and escaped HTML fragments
//!
//! # Example
//!
//! ```rust,ignore
//! use conker_storefront::{cart::CartStore, catalog::CatalogClient, purchase::PurchaseFlow};
//! use conker_storefront::storage::FileStore;
//!
//! let flow = PurchaseFlow::new(
//!     CatalogClient::new(&config.catalog)?,
//!     CartStore::new(FileStore::open(&config.cart_dir)?),
//! );
//! flow.add_product(&"42".parse()?).await?;
//! let html = conker_storefront::views::render_cart_items(&flow.cart().view())?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
mod filters;
pub mod purchase;
pub mod storage;
pub mod views;
