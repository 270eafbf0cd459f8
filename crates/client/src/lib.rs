//! `flogin-client`: product management client.
//!
//! Keeps a local view of the server's product catalog consistent across list,
//! create, edit, delete and detail flows. The server is the source of truth:
//! after any successful mutation the list is reloaded in full.
//!
//! - [`CatalogController`] orchestrates every flow and owns the view state.
//! - [`RemoteCatalog`] is the seam to the server; [`HttpCatalog`] implements it
//!   over REST.
//! - [`LoginController`] runs the sign-in form against an [`AuthGateway`].

pub mod config;
pub mod controller;
pub mod deletion;
pub mod detail;
pub mod form;
pub mod http;
pub mod list;
pub mod login;
pub mod notify;
pub mod remote;

pub use config::ClientConfig;
pub use controller::{CatalogController, DeleteOutcome, SubmitOutcome, ViewSnapshot};
pub use deletion::{DeletionSession, DeletionStatus};
pub use detail::DetailState;
pub use form::{FormMode, FormSession, SubmissionStatus, SubmitFailure};
pub use http::HttpCatalog;
pub use list::{ListState, ListStatus};
pub use login::{
    AuthError, AuthGateway, AuthToken, Credentials, LoginController, LoginSession, LoginStatus,
};
pub use notify::{StateBus, Subscription};
pub use remote::{CatalogError, RemoteCatalog};
