use async_trait::async_trait;
use domains::{Block, BlockParent, BlockRepository, DomainResult};
use uuid::Uuid;

use super::{block_from_row, insert_block, IdList, SqliteStore};
use crate::error::{StorageError, StorageResult};

impl SqliteStore {
    async fn find_block(&self, id: Uuid) -> StorageResult<Option<Block>> {
        sqlx::query("SELECT id, page_id, kind, content, position, created_at FROM blocks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(block_from_row)
            .transpose()
    }

    /// Resolves a reference list in one query, keeping list order.
    async fn resolve_blocks(&self, ids: &[Uuid]) -> StorageResult<Vec<Block>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query(
            "SELECT b.id, b.page_id, b.kind, b.content, b.position, b.created_at \
             FROM json_each(?) AS refs JOIN blocks AS b ON b.id = refs.value \
             ORDER BY refs.key",
        )
        .bind(serde_json::to_string(ids)?)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(block_from_row)
        .collect()
    }

    async fn insert_listed_block(&self, block: &Block, parent: BlockParent) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_block(&mut tx, block).await?;

        let (list, parent_id) = IdList::for_parent(parent);
        if !list.append(&mut tx, parent_id, block.id).await? {
            return Err(StorageError::NotFound { entity: "Page", id: parent_id.to_string() });
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_block(&self, block: &Block) -> StorageResult<()> {
        sqlx::query("UPDATE blocks SET content = ?, position = ? WHERE id = ?")
            .bind(&block.content)
            .bind(block.position)
            .bind(block.id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_block(&self, id: Uuid) -> StorageResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM blocks WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        for list in IdList::ALL_BLOCK_LISTS {
            list.pull_everywhere(&mut tx, id).await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl BlockRepository for SqliteStore {
    async fn find(&self, id: Uuid) -> DomainResult<Option<Block>> {
        Ok(self.find_block(id).await?)
    }

    async fn find_many(&self, ids: &[Uuid]) -> DomainResult<Vec<Block>> {
        Ok(self.resolve_blocks(ids).await?)
    }

    async fn insert(&self, block: &Block, parent: BlockParent) -> DomainResult<()> {
        Ok(self.insert_listed_block(block, parent).await?)
    }

    async fn update(&self, block: &Block) -> DomainResult<()> {
        Ok(self.update_block(block).await?)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.delete_block(id).await?)
    }
}
