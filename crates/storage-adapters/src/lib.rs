//! # storage-adapters
//!
//! Persistence implementations of the `domains` repository ports.
//!
//! Each entity gets its own table, referenced by id. Ordered child lists
//! (a collection's blocks, a page's blocks, a collection's sub-pages) are
//! stored as JSON arrays on the owning row, mirroring the document model.

#[cfg(feature = "db-sqlite")]
pub mod error;
#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "db-sqlite")]
pub use error::{StorageError, StorageResult};

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;
