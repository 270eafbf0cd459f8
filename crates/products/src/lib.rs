//! Products catalog model.
//!
//! Wire-level product and category types plus the local validation applied to
//! form drafts before anything is sent to the server. Pure logic: no IO, no HTTP.

pub mod category;
pub mod product;

pub use category::Category;
pub use product::{Field, FieldViolation, Product, ProductDraft, ProductInput, Violations};
