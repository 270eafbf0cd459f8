//! Cached product list and its load status.

use chrono::{DateTime, Utc};

use flogin_core::ProductId;
use flogin_products::Product;

/// Message shown when the product list cannot be fetched.
pub const LOAD_FAILED_MESSAGE: &str = "failed to load product list";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// In-memory copy of the server's product collection.
///
/// `items` is only meaningful while `status` is `Ready`. During a reload or after
/// a failed load the previous items are retained but inert.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    status: ListStatus,
    items: Vec<Product>,
    error_message: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ListStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == ListStatus::Ready
    }

    /// Items from the last successful load, regardless of current status.
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Items, but only when they reflect the latest load.
    pub fn ready_items(&self) -> Option<&[Product]> {
        self.is_ready().then_some(self.items.as_slice())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// When the current items were fetched.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Resolve a rendered row. Only `Ready` lists can be resolved against.
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.ready_items()?.iter().find(|p| p.id == id)
    }

    pub(crate) fn begin_load(&mut self) {
        self.status = ListStatus::Loading;
        self.error_message = None;
    }

    /// Full replacement; nothing from the previous list survives.
    pub(crate) fn finish_load(&mut self, items: Vec<Product>, at: DateTime<Utc>) {
        self.status = ListStatus::Ready;
        self.items = items;
        self.error_message = None;
        self.loaded_at = Some(at);
    }

    pub(crate) fn fail_load(&mut self) {
        self.status = ListStatus::Failed;
        self.error_message = Some(LOAD_FAILED_MESSAGE.to_string());
    }
}
