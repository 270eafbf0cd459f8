use serde::{Deserialize, Serialize};

use flogin_core::{CategoryId, DomainError, DomainResult};

/// Product category (read-only reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Look up a category by id in a loaded option list.
    pub fn find(categories: &[Category], id: CategoryId) -> DomainResult<&Category> {
        categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(DomainError::not_found)
    }
}
