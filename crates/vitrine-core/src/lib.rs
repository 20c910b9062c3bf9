//! Catalog, contact and account operations over the REST client.
//!
//! Every operation takes an [`AppContext`] and returns a [`CoreResult`].
//! Multi-step operations (a product and its images) are sequential single
//! calls; a failure midway is reported, never rolled back.

pub mod auth;
pub mod categories;
pub mod contacts;
pub mod context;
pub mod error;
pub mod guard;
pub mod images;
pub mod models;
pub mod products;
pub mod quotes;
pub mod session;
pub mod settings;
pub mod upload;
pub mod validate;

pub use context::AppContext;
pub use error::{CoreError, CoreResult};
pub use validate::Validate;

/// Current time as an RFC 3339 timestamp, the format of `updated_at` columns.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
