//! `flogin-core`: shared building blocks for the catalog client.
//!
//! Typed identifiers and the domain error model. No IO lives here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ProductId, SessionId, UserId};
