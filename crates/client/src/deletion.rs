//! Delete-confirmation session.

use flogin_core::{ProductId, SessionId};
use flogin_products::Product;

/// List-level message shown when a confirmed delete fails.
pub const DELETE_FAILED_MESSAGE: &str = "failed to delete product";

/// The session closes on every confirm outcome, so a failed state is never
/// observable; failure is reported through the list banner instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionStatus {
    #[default]
    Idle,
    Confirming,
}

/// A product awaiting destructive confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionSession {
    id: SessionId,
    target: Product,
    status: DeletionStatus,
}

impl DeletionSession {
    pub fn new(target: Product) -> Self {
        Self {
            id: SessionId::new(),
            target,
            status: DeletionStatus::Idle,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn target(&self) -> &Product {
        &self.target
    }

    pub fn status(&self) -> DeletionStatus {
        self.status
    }

    /// Mark the session as confirming and return what the remote call needs.
    pub(crate) fn confirm(&mut self) -> (SessionId, ProductId) {
        self.status = DeletionStatus::Confirming;
        (self.id, self.target.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flogin_core::CategoryId;

    #[test]
    fn confirm_returns_target_and_session() {
        let mut session = DeletionSession::new(Product {
            id: ProductId::new(1),
            name: "Laptop Pro X1".to_string(),
            price: 35_000_000,
            quantity: 50,
            category_id: CategoryId::new(1),
            created_by_id: None,
        });
        assert_eq!(session.status(), DeletionStatus::Idle);

        let (sid, pid) = session.confirm();
        assert_eq!(sid, session.id());
        assert_eq!(pid, ProductId::new(1));
        assert_eq!(session.status(), DeletionStatus::Confirming);
    }
}
