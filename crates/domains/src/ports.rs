//! # Ports
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Operations that touch more than one store take everything they need in a
//! single call so the adapter can run them inside one transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{Block, BlockParent, Collection, CollectionKind, Page, ParentLayer, User};

/// Account persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DomainError::Conflict` when the email is taken.
    async fn create(&self, user: &User) -> DomainResult<()>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    /// Returns false when no such user existed.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;
}

/// Favorite / OtherPage persistence. Every query is scoped to an owner.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Owner's documents in insertion order.
    async fn list(&self, kind: CollectionKind, owner: Uuid) -> DomainResult<Vec<Collection>>;
    async fn find(&self, kind: CollectionKind, id: Uuid, owner: Uuid) -> DomainResult<Option<Collection>>;
    /// Inserts `seed_blocks` and the collection together.
    async fn insert(&self, kind: CollectionKind, collection: &Collection, seed_blocks: &[Block]) -> DomainResult<()>;
    /// Writes the title and `updated_at`. Child lists are left as stored.
    async fn update(&self, kind: CollectionKind, collection: &Collection) -> DomainResult<()>;
    /// Moves the owner's document from `from` to `to` under the same id and
    /// re-points child pages, in one transaction. The row is read inside
    /// that transaction; if its block list is empty, `seed` is inserted and
    /// listed. Returns the stored document, or None (changing nothing) when
    /// it is not in `from` for that owner.
    async fn relocate(
        &self,
        id: Uuid,
        owner: Uuid,
        from: CollectionKind,
        to: CollectionKind,
        seed: &Block,
    ) -> DomainResult<Option<Collection>>;
    /// Deletes the document, its blocks and the pages under it.
    async fn delete(&self, kind: CollectionKind, id: Uuid, owner: Uuid) -> DomainResult<bool>;
}

/// Normalized Page persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn find(&self, id: Uuid, owner: Uuid) -> DomainResult<Option<Page>>;
    async fn list_by_layer(&self, layer: ParentLayer, owner: Uuid) -> DomainResult<Vec<Page>>;
    /// Inserts the page and its seed blocks and links a sub-page entry into
    /// the parent collection.
    async fn insert(&self, page: &Page, seed_blocks: &[Block]) -> DomainResult<()>;
    /// Writes title, `updated_at` and `last_edited_by`, and mirrors the title
    /// into the parent's sub-page entry. The block list is left as stored.
    async fn update(&self, page: &Page) -> DomainResult<()>;
    /// Deletes the page and its blocks and unlinks it from its parent.
    async fn delete(&self, id: Uuid, owner: Uuid) -> DomainResult<bool>;
}

/// Block persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BlockRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> DomainResult<Option<Block>>;
    /// Blocks in the order of `ids`; ids with no block are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> DomainResult<Vec<Block>>;
    /// Inserts the block and appends its id to the parent's list.
    async fn insert(&self, block: &Block, parent: BlockParent) -> DomainResult<()>;
    async fn update(&self, block: &Block) -> DomainResult<()>;
    /// Deletes the block and pulls its id from every list referencing it.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> DomainResult<String>;
    /// False for a mismatch and for an unparseable hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Session token contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenProvider: Send + Sync {
    fn issue(&self, user_id: Uuid) -> DomainResult<String>;
    /// Fails with `DomainError::Unauthorized` for bad or expired tokens.
    fn verify(&self, token: &str) -> DomainResult<Uuid>;
}
