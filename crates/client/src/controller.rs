//! Orchestration of the product management screen.
//!
//! [`CatalogController`] is the single authority over when the remote catalog is
//! called and how results are reconciled into list and session state.
//!
//! ## Reload over merge
//!
//! Every successful mutation (create, update, delete) is followed by a full
//! [`CatalogController::load_all`]. The returned entity is never patched into the
//! list locally; consistency with the server depends entirely on that reload.
//!
//! ## Concurrency
//!
//! State sits behind a short-lived lock that is never held across a remote call,
//! so operations may interleave:
//!
//! - Loads are not coalesced or cancelled. When two loads overlap, whichever
//!   response resolves last overwrites the list.
//! - Form and deletion results are keyed on the [`SessionId`] that started them.
//!   If the slot no longer holds that session (cancelled or replaced), the late
//!   result is dropped and no follow-up reload is issued.
//! - Double submission of the same form is not guarded against.
//! - Snapshots are published while the state lock is held, so the last
//!   snapshot a subscriber receives always matches [`CatalogController::snapshot`].

use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use flogin_core::{ProductId, SessionId};
use flogin_products::{Category, Product, ProductDraft, Violations};

use crate::deletion::{DELETE_FAILED_MESSAGE, DeletionSession};
use crate::detail::DetailState;
use crate::form::{FormMode, FormSession};
use crate::list::ListState;
use crate::notify::{StateBus, Subscription};
use crate::remote::{CatalogError, RemoteCatalog};

/// Everything a view needs to render the product screen.
///
/// Snapshots are copies; mutating one has no effect on the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewSnapshot {
    pub list: ListState,
    /// Category options for the form; `None` until loaded.
    pub categories: Option<Vec<Category>>,
    pub form: Option<FormSession>,
    pub deletion: Option<DeletionSession>,
    pub detail: DetailState,
    /// List-level error banner (failed deletes).
    pub banner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved remotely; the form is closed and the list was reloaded.
    Saved(Product),
    /// Local validation failed; nothing was sent.
    Invalid(Violations),
    /// The remote call failed; the form stays open for retry.
    Failed(CatalogError),
    /// The form was cancelled or replaced while the call was in flight.
    Stale,
    /// No form is open.
    NoForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Deleted remotely; the list was reloaded.
    Deleted(ProductId),
    /// The remote call failed; the banner is set and the row is still listed.
    Failed(CatalogError),
    /// The prompt was cancelled or replaced while the call was in flight.
    Stale,
    /// No deletion prompt is open.
    NoSession,
}

pub struct CatalogController<C> {
    catalog: C,
    state: Mutex<ViewSnapshot>,
    bus: StateBus<ViewSnapshot>,
}

impl<C> CatalogController<C>
where
    C: RemoteCatalog,
{
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            state: Mutex::new(ViewSnapshot::default()),
            bus: StateBus::new(),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ViewSnapshot {
        self.lock().clone()
    }

    /// Receive a snapshot after every state transition.
    pub fn subscribe(&self) -> Subscription<ViewSnapshot> {
        self.bus.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ViewSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` under the lock. Subscribers are notified only when `f` reports
    /// a change by returning `Some`.
    ///
    /// The snapshot is published before the lock is released, so subscribers
    /// receive transitions in the order they were applied.
    fn mutate<R>(&self, f: impl FnOnce(&mut ViewSnapshot) -> Option<R>) -> Option<R> {
        let mut state = self.lock();
        let out = f(&mut *state)?;
        self.bus.publish(state.clone());
        Some(out)
    }

    /// Fetch the full product list and replace the cached one.
    pub async fn load_all(&self) {
        self.mutate(|s| {
            s.list.begin_load();
            Some(())
        });

        match self.catalog.list().await {
            Ok(items) => {
                tracing::info!(count = items.len(), "product list loaded");
                self.mutate(|s| {
                    s.list.finish_load(items, Utc::now());
                    s.banner = None;
                    Some(())
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load product list");
                self.mutate(|s| {
                    s.list.fail_load();
                    Some(())
                });
            }
        }
    }

    /// Load category options unless they are already present.
    ///
    /// A failure leaves the options empty; the next form open retries.
    async fn ensure_categories(&self) {
        if self.lock().categories.is_some() {
            return;
        }

        match self.catalog.list_categories().await {
            Ok(categories) => {
                tracing::debug!(count = categories.len(), "category options loaded");
                self.mutate(|s| {
                    s.categories = Some(categories);
                    Some(())
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load category options");
            }
        }
    }

    /// Open an empty create form, replacing any open form.
    pub async fn begin_create(&self) -> SessionId {
        let session = FormSession::create();
        let id = session.id();
        self.mutate(|s| {
            s.form = Some(session);
            Some(())
        });
        self.ensure_categories().await;
        id
    }

    /// Open an edit form pre-populated from the listed product.
    ///
    /// No-op (returns `None`) if the product is not in the current list.
    pub async fn begin_edit(&self, product_id: ProductId) -> Option<SessionId> {
        let id = self.mutate(|s| {
            let session = FormSession::edit(s.list.find(product_id)?);
            let id = session.id();
            s.form = Some(session);
            Some(id)
        });

        match id {
            Some(id) => {
                self.ensure_categories().await;
                Some(id)
            }
            None => {
                tracing::debug!(%product_id, "edit requested for unlisted product; ignoring");
                None
            }
        }
    }

    /// Validate and submit the open form.
    pub async fn submit_form(&self, fields: ProductDraft) -> SubmitOutcome {
        let Some(staged) = self.mutate(|s| s.form.as_mut().map(|form| form.stage(fields))) else {
            tracing::debug!("submit without an open form; ignoring");
            return SubmitOutcome::NoForm;
        };

        let submission = match staged {
            Ok(submission) => submission,
            Err(violations) => return SubmitOutcome::Invalid(violations),
        };

        let result = match submission.mode {
            FormMode::Create => self.catalog.create(&submission.input).await,
            FormMode::Edit(id) => self.catalog.update(id, &submission.input).await,
        };

        let session = submission.session;
        let holds_session = |s: &ViewSnapshot| s.form.as_ref().is_some_and(|f| f.id() == session);

        match result {
            Ok(product) => {
                let applied = self.mutate(|s| {
                    if !holds_session(&*s) {
                        return None;
                    }
                    s.form = None;
                    Some(())
                });
                if applied.is_none() {
                    tracing::debug!(%session, "form closed before save completed; ignoring result");
                    return SubmitOutcome::Stale;
                }

                tracing::info!(product_id = %product.id, mode = ?submission.mode, "product saved");
                self.load_all().await;
                SubmitOutcome::Saved(product)
            }
            Err(err) => {
                let applied = self.mutate(|s| {
                    if !holds_session(&*s) {
                        return None;
                    }
                    s.form.as_mut()?.fail_remote(err.user_message());
                    Some(())
                });
                if applied.is_none() {
                    tracing::debug!(%session, "form closed before save failed; ignoring result");
                    return SubmitOutcome::Stale;
                }

                tracing::warn!(error = %err, mode = ?submission.mode, "failed to save product");
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Discard the open form. Returns whether one was open.
    pub fn cancel_form(&self) -> bool {
        self.mutate(|s| s.form.take().map(|_| ())).is_some()
    }

    /// Open a deletion prompt for the listed product.
    ///
    /// No-op (returns `None`) if the product is not in the current list.
    pub fn begin_delete(&self, product_id: ProductId) -> Option<SessionId> {
        let id = self.mutate(|s| {
            let session = DeletionSession::new(s.list.find(product_id)?.clone());
            let id = session.id();
            s.deletion = Some(session);
            Some(id)
        });

        if id.is_none() {
            tracing::debug!(%product_id, "delete requested for unlisted product; ignoring");
        }
        id
    }

    /// Delete the prompt's target.
    ///
    /// The prompt closes whatever the outcome. On failure the row stays listed
    /// (no optimistic removal) and the list banner is set.
    pub async fn confirm_delete(&self) -> DeleteOutcome {
        let Some((session, target)) = self.mutate(|s| s.deletion.as_mut().map(DeletionSession::confirm))
        else {
            tracing::debug!("confirm without an open deletion prompt; ignoring");
            return DeleteOutcome::NoSession;
        };

        let result = self.catalog.delete(target).await;

        let applied = self.mutate(|s| {
            if !s.deletion.as_ref().is_some_and(|d| d.id() == session) {
                return None;
            }
            s.deletion = None;
            if result.is_err() {
                s.banner = Some(DELETE_FAILED_MESSAGE.to_string());
            }
            Some(())
        });
        if applied.is_none() {
            tracing::debug!(%session, "deletion prompt closed before delete completed; ignoring result");
            return DeleteOutcome::Stale;
        }

        match result {
            Ok(()) => {
                tracing::info!(product_id = %target, "product deleted");
                self.load_all().await;
                DeleteOutcome::Deleted(target)
            }
            Err(err) => {
                tracing::warn!(product_id = %target, error = %err, "failed to delete product");
                DeleteOutcome::Failed(err)
            }
        }
    }

    /// Discard the deletion prompt. Returns whether one was open.
    pub fn cancel_delete(&self) -> bool {
        self.mutate(|s| s.deletion.take().map(|_| ())).is_some()
    }

    /// Clear the list-level banner.
    pub fn dismiss_banner(&self) -> bool {
        self.mutate(|s| s.banner.take().map(|_| ())).is_some()
    }

    /// Load a single product for the detail view.
    ///
    /// If another id was requested while this one was loading, the result is
    /// discarded.
    pub async fn load_detail(&self, product_id: ProductId) -> DetailState {
        self.mutate(|s| {
            s.detail = DetailState::Loading(product_id);
            Some(())
        });

        let result = self.catalog.get(product_id).await;
        if let Err(err) = &result {
            tracing::warn!(%product_id, error = %err, "failed to load product detail");
        }

        let next = match result {
            Ok(product) => DetailState::Ready(product),
            Err(_) => DetailState::not_found(product_id),
        };

        let applied = self.mutate(|s| {
            if s.detail != DetailState::Loading(product_id) {
                return None;
            }
            s.detail = next;
            Some(())
        });
        if applied.is_none() {
            tracing::debug!(%product_id, "detail request superseded; ignoring result");
        }

        self.lock().detail.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use flogin_core::CategoryId;
    use flogin_products::ProductInput;

    /// Catalog that fails every call.
    struct Offline;

    #[async_trait]
    impl RemoteCatalog for Offline {
        async fn list(&self) -> Result<Vec<Product>, CatalogError> {
            Err(CatalogError::Network("offline".to_string()))
        }
        async fn get(&self, _id: ProductId) -> Result<Product, CatalogError> {
            Err(CatalogError::Network("offline".to_string()))
        }
        async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
            Err(CatalogError::Network("offline".to_string()))
        }
        async fn create(&self, _input: &ProductInput) -> Result<Product, CatalogError> {
            Err(CatalogError::Network("offline".to_string()))
        }
        async fn update(&self, _id: ProductId, _input: &ProductInput) -> Result<Product, CatalogError> {
            Err(CatalogError::Network("offline".to_string()))
        }
        async fn delete(&self, _id: ProductId) -> Result<(), CatalogError> {
            Err(CatalogError::Network("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_category_load_still_opens_form() {
        let controller = CatalogController::new(Offline);
        let id = controller.begin_create().await;

        let snap = controller.snapshot();
        assert_eq!(snap.form.as_ref().map(|f| f.id()), Some(id));
        assert!(snap.categories.is_none());
    }

    #[tokio::test]
    async fn remote_failure_keeps_form_open_with_message() {
        let controller = CatalogController::new(Offline);
        controller.begin_create().await;

        let outcome = controller
            .submit_form(ProductDraft {
                name: "Mouse".to_string(),
                price: Some(750_000),
                quantity: Some(200),
                category_id: Some(CategoryId::new(1)),
                created_by_id: None,
            })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Failed(CatalogError::Network(_))));
        let form = controller.snapshot().form.unwrap();
        assert_eq!(form.remote_error(), Some("network error: offline"));
        assert_eq!(form.fields().name, "Mouse");
    }

    #[tokio::test]
    async fn sessions_cannot_open_on_empty_list() {
        let controller = CatalogController::new(Offline);
        assert!(controller.begin_edit(ProductId::new(1)).await.is_none());
        assert!(controller.begin_delete(ProductId::new(1)).is_none());
        assert_eq!(controller.confirm_delete().await, DeleteOutcome::NoSession);
        assert_eq!(controller.submit_form(ProductDraft::default()).await, SubmitOutcome::NoForm);
    }

    #[tokio::test]
    async fn cancel_reports_whether_anything_closed() {
        let controller = CatalogController::new(Offline);
        assert!(!controller.cancel_form());
        controller.begin_create().await;
        assert!(controller.cancel_form());
        assert!(controller.snapshot().form.is_none());
        assert!(!controller.cancel_delete());
        assert!(!controller.dismiss_banner());
    }

    #[tokio::test]
    async fn detail_failure_reports_not_found() {
        let controller = CatalogController::new(Offline);
        let state = controller.load_detail(ProductId::new(999)).await;
        assert_eq!(state.error_message(), Some(crate::detail::DETAIL_NOT_FOUND_MESSAGE));
        assert_eq!(state.requested(), Some(ProductId::new(999)));
    }
}
