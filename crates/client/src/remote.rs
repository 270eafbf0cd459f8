//! The remote catalog seam.
//!
//! The controller only ever talks to the server through [`RemoteCatalog`]. The
//! HTTP implementation lives in [`crate::http`]; tests substitute scripted fakes.

use std::sync::Arc;

use async_trait::async_trait;

use flogin_core::ProductId;
use flogin_products::{Category, Product, ProductInput};

/// Failure reported by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The server could not be reached (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with an unexpected failure status.
    #[error("server error ({0}): {1}")]
    Server(u16, String),
    /// The referenced product or category does not exist (stale identity).
    #[error("not found: {0}")]
    NotFound(String),
    /// The server rejected the payload.
    #[error("{0}")]
    Validation(String),
    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Shown when the server rejects a payload without saying why.
pub const REJECTED_FALLBACK_MESSAGE: &str = "request rejected";
/// Shown when the server reports a missing entity without saying which.
pub const NOT_FOUND_FALLBACK_MESSAGE: &str = "not found";

impl CatalogError {
    /// Message suitable for inline display next to a form. Never empty.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Validation(msg) => or_fallback(msg, REJECTED_FALLBACK_MESSAGE),
            CatalogError::NotFound(msg) => or_fallback(msg, NOT_FOUND_FALLBACK_MESSAGE),
            CatalogError::Server(status, msg) => {
                or_fallback(msg, &format!("server error ({status})"))
            }
            other => other.to_string(),
        }
    }
}

fn or_fallback(msg: &str, fallback: &str) -> String {
    let msg = msg.trim();
    if msg.is_empty() {
        fallback.to_string()
    } else {
        msg.to_string()
    }
}

/// Product/category CRUD against the source of truth.
///
/// Implementations are plain request wrappers: no retries, no caching.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, CatalogError>;

    async fn get(&self, id: ProductId) -> Result<Product, CatalogError>;

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// Create a product; the server assigns its id.
    async fn create(&self, input: &ProductInput) -> Result<Product, CatalogError>;

    /// Replace every editable field of an existing product.
    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, CatalogError>;

    async fn delete(&self, id: ProductId) -> Result<(), CatalogError>;
}

#[async_trait]
impl<C> RemoteCatalog for Arc<C>
where
    C: RemoteCatalog + ?Sized,
{
    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        (**self).list().await
    }

    async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        (**self).get(id).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        (**self).list_categories().await
    }

    async fn create(&self, input: &ProductInput) -> Result<Product, CatalogError> {
        (**self).create(input).await
    }

    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, CatalogError> {
        (**self).update(id, input).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        (**self).delete(id).await
    }
}
