//! Single-product detail view state.

use flogin_core::ProductId;
use flogin_products::Product;

/// Message shown when a product cannot be loaded by id.
pub const DETAIL_NOT_FOUND_MESSAGE: &str = "product not found";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading(ProductId),
    Ready(Product),
    Failed { id: ProductId, message: String },
}

impl DetailState {
    /// The id this state is (or was last) about.
    pub fn requested(&self) -> Option<ProductId> {
        match self {
            DetailState::Idle => None,
            DetailState::Loading(id) => Some(*id),
            DetailState::Ready(p) => Some(p.id),
            DetailState::Failed { id, .. } => Some(*id),
        }
    }

    pub fn product(&self) -> Option<&Product> {
        match self {
            DetailState::Ready(p) => Some(p),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            DetailState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub(crate) fn not_found(id: ProductId) -> Self {
        DetailState::Failed {
            id,
            message: DETAIL_NOT_FOUND_MESSAGE.to_string(),
        }
    }
}
