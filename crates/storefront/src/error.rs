//! Unified error handling.
//!
//! Provides a unified `AppError` type for callers that drive several parts of
//! the library (the CLI, an embedding view layer). Each variant knows which
//! message is safe to show the shopper.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::purchase::PurchaseError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage could not be opened or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart operation was rejected or could not be saved.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Catalog-verified addition failed.
    #[error("Purchase error: {0}")]
    Purchase(#[from] PurchaseError),

    /// Template rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Message suitable for showing to the shopper.
    ///
    /// Internal details (paths, HTTP bodies) are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => format!("Invalid configuration: {err}"),
            Self::Storage(_) | Self::Render(_) => "Internal error".to_string(),
            Self::Cart(err) => err.user_message(),
            Self::Catalog(CatalogError::NotFound(_)) => "Product not found".to_string(),
            Self::Catalog(_) => "Unable to reach the store. Please try again.".to_string(),
            Self::Purchase(err) => err.user_message(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Whether the error is a rejection the user can act on, as opposed to a
    /// failure of the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::BadRequest(_)
                | Self::Catalog(CatalogError::NotFound(_))
                | Self::Cart(
                    CartError::OutOfStock(_)
                        | CartError::StockLimitReached { .. }
                        | CartError::InvalidItem(_)
                        | CartError::QuantityOverflow
                )
                | Self::Purchase(
                    PurchaseError::Unverifiable(_)
                        | PurchaseError::Unavailable(CatalogError::NotFound(_))
                        | PurchaseError::Cart(
                            CartError::OutOfStock(_)
                                | CartError::StockLimitReached { .. }
                                | CartError::InvalidItem(_)
                                | CartError::QuantityOverflow
                        )
                )
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
