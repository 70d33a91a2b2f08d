//! # services
//!
//! Use cases of the NotY backend. Each service depends only on the port
//! traits in `domains`, so the same logic runs against SQLite in production
//! and against mockall mocks in tests.

pub mod auth;
pub mod blocks;
pub mod documents;
pub mod pages;

pub use auth::{AuthOptions, AuthService, AuthSession, RegisterInput};
pub use blocks::{BlockService, BlockUpdate, NewBlock};
pub use documents::DocumentLocator;
pub use pages::{CreatePage, PageService, PageUpdate};

/// Title given to pages created without one.
pub const DEFAULT_PAGE_TITLE: &str = "New Page";

/// Title of the page provisioned for every new account.
pub const FIRST_PAGE_TITLE: &str = "My First Page";

/// Trims a client-supplied text field, treating blank as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
