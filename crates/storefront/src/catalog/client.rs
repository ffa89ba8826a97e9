//! HTTP implementation of the catalog.
//!
//! Uses `reqwest` with an optional bearer token and a per-request timeout.

use std::future::Future;
use std::sync::Arc;

use conker_core::ProductId;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

use super::{Catalog, CatalogError, CatalogProduct};
use crate::config::CatalogConfig;

/// Maximum number of response body characters kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for the catalog REST API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field(
                "api_token",
                &self.inner.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
            }),
        })
    }

    /// The URL a product is fetched from.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Url` if the base URL cannot carry a path.
    pub fn product_url(&self, id: &ProductId) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push("product")
            .push(id.as_str());
        Ok(url)
    }

    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// - `CatalogError::NotFound` on HTTP 404
    /// - `CatalogError::RateLimited` on HTTP 429
    /// - `CatalogError::Status` on any other non-success status
    /// - `CatalogError::Parse` if the body is not a product
    /// - `CatalogError::Http` on transport failure or timeout
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: &ProductId) -> Result<CatalogProduct, CatalogError> {
        let url = self.product_url(id)?;

        let mut request = self
            .inner
            .client
            .get(url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id.clone()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;
        let excerpt = || response_text.chars().take(BODY_EXCERPT_CHARS).collect::<String>();

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: excerpt(),
            });
        }

        let product: CatalogProduct = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(),
                "Failed to parse catalog product"
            );
            CatalogError::Parse(e)
        })?;

        debug!(stock = %product.stock, "Fetched product");
        Ok(product)
    }
}

impl Catalog for CatalogClient {
    fn product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, CatalogError>> + Send {
        self.fetch_product(id)
    }
}
