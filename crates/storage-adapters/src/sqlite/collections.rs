use async_trait::async_trait;
use chrono::Utc;
use domains::{Block, Collection, CollectionKind, CollectionRepository, DomainResult};
use sqlx::sqlite::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use super::{collection_from_row, collection_table, insert_block, insert_collection, SqliteStore};
use crate::error::StorageResult;

const COLLECTION_COLUMNS: &str = "id, title, owner_id, pages, sub_pages, created_at, updated_at";

impl SqliteStore {
    async fn list_collections(&self, kind: CollectionKind, owner: Uuid) -> StorageResult<Vec<Collection>> {
        let table = collection_table(kind);
        let sql = format!("SELECT {COLLECTION_COLUMNS} FROM {table} WHERE owner_id = ? ORDER BY rowid");
        sqlx::query(&sql)
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| collection_from_row(table, row))
            .collect()
    }

    async fn find_collection(&self, kind: CollectionKind, id: Uuid, owner: Uuid) -> StorageResult<Option<Collection>> {
        let mut conn = self.pool.acquire().await?;
        find_collection_in(&mut conn, kind, id, owner).await
    }

    async fn insert_seeded_collection(
        &self,
        kind: CollectionKind,
        collection: &Collection,
        seed_blocks: &[Block],
    ) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        for block in seed_blocks {
            insert_block(&mut tx, block).await?;
        }
        insert_collection(&mut tx, kind, collection).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Child lists are owned by the block, page and relocate operations and
    /// are never written from a caller's copy.
    async fn update_collection(&self, kind: CollectionKind, collection: &Collection) -> StorageResult<()> {
        let sql = format!(
            "UPDATE {} SET title = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
            collection_table(kind)
        );
        sqlx::query(&sql)
            .bind(&collection.title)
            .bind(collection.updated_at)
            .bind(collection.id.to_string())
            .bind(collection.owner_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Atomic move between the two stores.
    ///
    /// # Developer Note
    /// The row is read, deleted and re-inserted under the same id inside one
    /// transaction, so blocks or sub-pages linked since the caller last read
    /// the document travel with it, and a failure midway leaves it where it
    /// was instead of in neither store.
    async fn relocate_collection(
        &self,
        id: Uuid,
        owner: Uuid,
        from: CollectionKind,
        to: CollectionKind,
        seed: &Block,
    ) -> StorageResult<Option<Collection>> {
        let mut tx = self.pool.begin().await?;

        let Some(mut collection) = find_collection_in(&mut tx, from, id, owner).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        delete_owned(&mut tx, from, id, owner).await?;

        if collection.pages.is_empty() {
            insert_block(&mut tx, seed).await?;
            collection.pages.push(seed.id);
        }
        collection.updated_at = Utc::now();
        insert_collection(&mut tx, to, &collection).await?;

        // Child pages keep pointing at the same id, under the new layer type.
        sqlx::query("UPDATE pages SET layer_type = ? WHERE layer_type = ? AND layer_id = ?")
            .bind(to.layer_type())
            .bind(from.layer_type())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(%id, %from, %to, "relocated collection");
        Ok(Some(collection))
    }

    async fn delete_collection(&self, kind: CollectionKind, id: Uuid, owner: Uuid) -> StorageResult<bool> {
        let mut tx = self.pool.begin().await?;

        if !delete_owned(&mut tx, kind, id, owner).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        // Blocks always name the document that lists them in page_id, so the
        // cascade can go by back-reference.
        sqlx::query(
            "DELETE FROM blocks WHERE page_id = ? \
             OR page_id IN (SELECT id FROM pages WHERE layer_type = ? AND layer_id = ?)",
        )
        .bind(id.to_string())
        .bind(kind.layer_type())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM pages WHERE layer_type = ? AND layer_id = ?")
            .bind(kind.layer_type())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

async fn find_collection_in(
    conn: &mut SqliteConnection,
    kind: CollectionKind,
    id: Uuid,
    owner: Uuid,
) -> StorageResult<Option<Collection>> {
    let table = collection_table(kind);
    let sql = format!("SELECT {COLLECTION_COLUMNS} FROM {table} WHERE id = ? AND owner_id = ?");
    sqlx::query(&sql)
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&mut *conn)
        .await?
        .as_ref()
        .map(|row| collection_from_row(table, row))
        .transpose()
}

async fn delete_owned(conn: &mut SqliteConnection, kind: CollectionKind, id: Uuid, owner: Uuid) -> StorageResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ? AND owner_id = ?", collection_table(kind));
    let result = sqlx::query(&sql)
        .bind(id.to_string())
        .bind(owner.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl CollectionRepository for SqliteStore {
    async fn list(&self, kind: CollectionKind, owner: Uuid) -> DomainResult<Vec<Collection>> {
        Ok(self.list_collections(kind, owner).await?)
    }

    async fn find(&self, kind: CollectionKind, id: Uuid, owner: Uuid) -> DomainResult<Option<Collection>> {
        Ok(self.find_collection(kind, id, owner).await?)
    }

    async fn insert(&self, kind: CollectionKind, collection: &Collection, seed_blocks: &[Block]) -> DomainResult<()> {
        Ok(self.insert_seeded_collection(kind, collection, seed_blocks).await?)
    }

    async fn update(&self, kind: CollectionKind, collection: &Collection) -> DomainResult<()> {
        Ok(self.update_collection(kind, collection).await?)
    }

    async fn relocate(
        &self,
        id: Uuid,
        owner: Uuid,
        from: CollectionKind,
        to: CollectionKind,
        seed: &Block,
    ) -> DomainResult<Option<Collection>> {
        Ok(self.relocate_collection(id, owner, from, to, seed).await?)
    }

    async fn delete(&self, kind: CollectionKind, id: Uuid, owner: Uuid) -> DomainResult<bool> {
        Ok(self.delete_collection(kind, id, owner).await?)
    }
}
