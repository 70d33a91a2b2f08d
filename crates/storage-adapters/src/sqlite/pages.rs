use async_trait::async_trait;
use domains::{Block, DomainResult, Page, PageRepository, ParentLayer, SubPage};
use sqlx::sqlite::SqliteConnection;
use uuid::Uuid;

use super::{insert_block, page_from_row, read_sub_pages, write_sub_pages, SqliteStore};
use crate::error::{StorageError, StorageResult};

const PAGE_COLUMNS: &str = "id, title, owner_id, layer_type, layer_id, blocks, created_at, updated_at, last_edited_by";

impl SqliteStore {
    async fn find_page(&self, id: Uuid, owner: Uuid) -> StorageResult<Option<Page>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = ? AND owner_id = ?");
        sqlx::query(&sql)
            .bind(id.to_string())
            .bind(owner.to_string())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(page_from_row)
            .transpose()
    }

    async fn pages_in_layer(&self, layer: ParentLayer, owner: Uuid) -> StorageResult<Vec<Page>> {
        let sql = format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE layer_type = ? AND layer_id = ? AND owner_id = ? ORDER BY rowid"
        );
        sqlx::query(&sql)
            .bind(layer.kind().layer_type())
            .bind(layer.id().to_string())
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(page_from_row)
            .collect()
    }

    async fn insert_page(&self, page: &Page, seed_blocks: &[Block]) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        let Some(mut sub_pages) = read_sub_pages(&mut tx, page.parent).await? else {
            return Err(StorageError::NotFound {
                entity: page.parent.kind().layer_type(),
                id: page.parent.id().to_string(),
            });
        };
        for block in seed_blocks {
            insert_block(&mut tx, block).await?;
        }
        sqlx::query(
            "INSERT INTO pages (id, title, owner_id, layer_type, layer_id, blocks, created_at, updated_at, last_edited_by) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(page.id.to_string())
        .bind(&page.title)
        .bind(page.owner_id.to_string())
        .bind(page.parent.kind().layer_type())
        .bind(page.parent.id().to_string())
        .bind(serde_json::to_string(&page.blocks)?)
        .bind(page.created_at)
        .bind(page.updated_at)
        .bind(page.last_edited_by.map(|id| id.to_string()))
        .execute(&mut *tx)
        .await?;

        sub_pages.push(SubPage { id: page.id, title: page.title.clone() });
        write_sub_pages(&mut tx, page.parent, &sub_pages).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Writes only the page's own fields. The block list belongs to the
    /// block operations and the parent to relocation, so both are taken
    /// from the stored row rather than from `page`.
    async fn update_page(&self, page: &Page) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE pages SET title = ?, updated_at = ?, last_edited_by = ? WHERE id = ? AND owner_id = ?")
            .bind(&page.title)
            .bind(page.updated_at)
            .bind(page.last_edited_by.map(|id| id.to_string()))
            .bind(page.id.to_string())
            .bind(page.owner_id.to_string())
            .execute(&mut *tx)
            .await?;

        let Some(stored) = find_page_in(&mut tx, page.id, page.owner_id).await? else {
            tx.rollback().await?;
            return Ok(());
        };

        // Keep the denormalized title on the parent in sync.
        if let Some(mut sub_pages) = read_sub_pages(&mut tx, stored.parent).await? {
            if let Some(entry) = sub_pages.iter_mut().find(|s| s.id == stored.id) {
                entry.title = stored.title.clone();
                write_sub_pages(&mut tx, stored.parent, &sub_pages).await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_page(&self, id: Uuid, owner: Uuid) -> StorageResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(page) = find_page_in(&mut tx, id, owner).await? else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("DELETE FROM blocks WHERE page_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if let Some(mut sub_pages) = read_sub_pages(&mut tx, page.parent).await? {
            sub_pages.retain(|s| s.id != id);
            write_sub_pages(&mut tx, page.parent, &sub_pages).await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

async fn find_page_in(conn: &mut SqliteConnection, id: Uuid, owner: Uuid) -> StorageResult<Option<Page>> {
    let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = ? AND owner_id = ?");
    sqlx::query(&sql)
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&mut *conn)
        .await?
        .as_ref()
        .map(page_from_row)
        .transpose()
}

#[async_trait]
impl PageRepository for SqliteStore {
    async fn find(&self, id: Uuid, owner: Uuid) -> DomainResult<Option<Page>> {
        Ok(self.find_page(id, owner).await?)
    }

    async fn list_by_layer(&self, layer: ParentLayer, owner: Uuid) -> DomainResult<Vec<Page>> {
        Ok(self.pages_in_layer(layer, owner).await?)
    }

    async fn insert(&self, page: &Page, seed_blocks: &[Block]) -> DomainResult<()> {
        Ok(self.insert_page(page, seed_blocks).await?)
    }

    async fn update(&self, page: &Page) -> DomainResult<()> {
        Ok(self.update_page(page).await?)
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> DomainResult<bool> {
        Ok(self.delete_page(id, owner).await?)
    }
}
