//! Block CRUD. Blocks carry no owner of their own; access is checked through
//! the document that lists them.

use std::sync::Arc;

use domains::{Block, BlockKind, BlockRepository, DomainError, DomainResult};
use tracing::info;
use uuid::Uuid;

use crate::documents::DocumentLocator;

#[derive(Debug, Clone)]
pub struct NewBlock {
    /// Collection or Page document to append to
    pub page_id: Uuid,
    pub kind: BlockKind,
    pub content: Option<String>,
    pub position: i64,
}

#[derive(Debug, Clone, Default)]
pub struct BlockUpdate {
    pub content: Option<String>,
    pub position: Option<i64>,
}

pub struct BlockService {
    blocks: Arc<dyn BlockRepository>,
    documents: DocumentLocator,
}

impl BlockService {
    pub fn new(blocks: Arc<dyn BlockRepository>, documents: DocumentLocator) -> Self {
        Self { blocks, documents }
    }

    pub async fn create_block(&self, owner: Uuid, input: NewBlock) -> DomainResult<Block> {
        let parent = self
            .documents
            .locate(input.page_id, owner)
            .await?
            .ok_or_else(|| DomainError::not_found("Page", input.page_id))?;

        let block = Block::new(parent.id(), input.kind, input.content.unwrap_or_default(), input.position);
        self.blocks.insert(&block, parent.as_block_parent()).await?;
        info!(owner = %owner, block_id = %block.id, page_id = %block.page_id, "created block");
        Ok(block)
    }

    pub async fn update_block(&self, owner: Uuid, id: Uuid, update: BlockUpdate) -> DomainResult<Block> {
        let mut block = self.owned_block(owner, id).await?;
        if let Some(content) = update.content {
            block.content = content;
        }
        if let Some(position) = update.position {
            block.position = position;
        }
        self.blocks.update(&block).await?;
        info!(owner = %owner, block_id = %id, "updated block");
        Ok(block)
    }

    pub async fn delete_block(&self, owner: Uuid, id: Uuid) -> DomainResult<()> {
        self.owned_block(owner, id).await?;
        if !self.blocks.delete(id).await? {
            return Err(DomainError::not_found("Block", id));
        }
        info!(owner = %owner, block_id = %id, "deleted block");
        Ok(())
    }

    /// Blocks of other users' documents are reported as missing.
    async fn owned_block(&self, owner: Uuid, id: Uuid) -> DomainResult<Block> {
        let block = self
            .blocks
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Block", id))?;
        if self.documents.locate(block.page_id, owner).await?.is_none() {
            return Err(DomainError::not_found("Block", id));
        }
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        BlockParent, Collection, CollectionKind, MockBlockRepository, MockCollectionRepository, MockPageRepository,
    };
    use tokio_test::{assert_err, assert_ok};

    fn locator_with(owned: Option<Collection>) -> DocumentLocator {
        let mut collections = MockCollectionRepository::new();
        collections.expect_find().returning(move |kind, _, _| {
            Ok(owned.clone().filter(|_| kind == CollectionKind::OtherPage))
        });
        let mut pages = MockPageRepository::new();
        pages.expect_find().returning(|_, _| Ok(None));
        DocumentLocator::new(Arc::new(collections), Arc::new(pages), Arc::new(MockBlockRepository::new()))
    }

    #[tokio::test]
    async fn create_appends_to_located_parent() {
        let owner = Uuid::now_v7();
        let doc = Collection::new("Inbox", owner);
        let doc_id = doc.id;

        let mut blocks = MockBlockRepository::new();
        blocks
            .expect_insert()
            .withf(move |b, parent| {
                b.page_id == doc_id
                    && b.kind == BlockKind::Image
                    && *parent == BlockParent::Collection(CollectionKind::OtherPage, doc_id)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = BlockService::new(Arc::new(blocks), locator_with(Some(doc)));
        let block = assert_ok!(
            svc.create_block(
                owner,
                NewBlock { page_id: doc_id, kind: BlockKind::Image, content: Some("cat.png".into()), position: 4 },
            )
            .await
        );
        assert_eq!(block.position, 4);
        assert_eq!(block.content, "cat.png");
    }

    #[tokio::test]
    async fn create_on_unknown_page_is_not_found() {
        let mut blocks = MockBlockRepository::new();
        blocks.expect_insert().never();
        let svc = BlockService::new(Arc::new(blocks), locator_with(None));

        let err = assert_err!(
            svc.create_block(
                Uuid::now_v7(),
                NewBlock { page_id: Uuid::now_v7(), kind: BlockKind::Text, content: None, position: 0 },
            )
            .await
        );
        assert!(matches!(err, DomainError::NotFound(..)));
    }

    #[tokio::test]
    async fn update_applies_only_provided_fields() {
        let owner = Uuid::now_v7();
        let doc = Collection::new("Inbox", owner);
        let existing = Block::new(doc.id, BlockKind::Text, "old", 2);
        let id = existing.id;

        let mut blocks = MockBlockRepository::new();
        blocks.expect_find().returning(move |_| Ok(Some(existing.clone())));
        blocks
            .expect_update()
            .withf(|b| b.content == "old" && b.position == 9)
            .times(1)
            .returning(|_| Ok(()));

        let svc = BlockService::new(Arc::new(blocks), locator_with(Some(doc)));
        let block = assert_ok!(
            svc.update_block(owner, id, BlockUpdate { content: None, position: Some(9) }).await
        );
        assert_eq!(block.position, 9);
    }

    #[tokio::test]
    async fn blocks_of_foreign_documents_are_hidden() {
        let existing = Block::default_text(Uuid::now_v7());
        let mut blocks = MockBlockRepository::new();
        blocks.expect_find().returning(move |_| Ok(Some(existing.clone())));
        blocks.expect_delete().never();

        let svc = BlockService::new(Arc::new(blocks), locator_with(None));
        let err = assert_err!(svc.delete_block(Uuid::now_v7(), Uuid::now_v7()).await);
        assert!(matches!(err, DomainError::NotFound(entity, _) if entity == "Block"));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn block_changes_are_logged() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let owner = Uuid::now_v7();
        let doc = Collection::new("Inbox", owner);
        let doc_id = doc.id;
        let existing = Block::new(doc_id, BlockKind::Text, "old", 0);
        let existing_id = existing.id;

        let mut blocks = MockBlockRepository::new();
        blocks.expect_insert().returning(|_, _| Ok(()));
        blocks.expect_find().returning(move |_| Ok(Some(existing.clone())));
        blocks.expect_update().returning(|_| Ok(()));

        let svc = BlockService::new(Arc::new(blocks), locator_with(Some(doc)));
        let created = assert_ok!(
            svc.create_block(
                owner,
                NewBlock { page_id: doc_id, kind: BlockKind::Text, content: None, position: 0 },
            )
            .await
        );
        assert_ok!(
            svc.update_block(owner, existing_id, BlockUpdate { content: Some("new".into()), position: None })
                .await
        );

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("created block"), "{output}");
        assert!(output.contains(&format!("block_id={}", created.id)), "{output}");
        assert!(output.contains("updated block"), "{output}");
        assert!(output.contains(&format!("block_id={existing_id}")), "{output}");
    }
}
