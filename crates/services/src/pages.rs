//! Collections, pages and the Favorite ⇄ OtherPage move.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Block, BlockRepository, Collection, CollectionKind, CollectionRepository, CollectionView, Document, DocumentView,
    DomainError, DomainResult, Page, PageRepository, PageView, ParentLayer,
};
use tracing::info;
use uuid::Uuid;

use crate::documents::DocumentLocator;
use crate::{non_blank, DEFAULT_PAGE_TITLE};

#[derive(Debug, Clone, Default)]
pub struct CreatePage {
    pub title: Option<String>,
    /// None creates a top-level OtherPage
    pub parent: Option<ParentLayer>,
}

#[derive(Debug, Clone, Default)]
pub struct PageUpdate {
    pub title: Option<String>,
    /// Replaces the first block's content when present and non-empty
    pub content: Option<String>,
}

pub struct PageService {
    collections: Arc<dyn CollectionRepository>,
    pages: Arc<dyn PageRepository>,
    blocks: Arc<dyn BlockRepository>,
    documents: DocumentLocator,
}

impl PageService {
    pub fn new(
        collections: Arc<dyn CollectionRepository>,
        pages: Arc<dyn PageRepository>,
        blocks: Arc<dyn BlockRepository>,
    ) -> Self {
        let documents = DocumentLocator::new(collections.clone(), pages.clone(), blocks.clone());
        Self { collections, pages, blocks, documents }
    }

    pub fn documents(&self) -> &DocumentLocator {
        &self.documents
    }

    pub async fn favorites(&self, owner: Uuid) -> DomainResult<Vec<CollectionView>> {
        self.list(CollectionKind::Favorite, owner).await
    }

    pub async fn other_pages(&self, owner: Uuid) -> DomainResult<Vec<CollectionView>> {
        self.list(CollectionKind::OtherPage, owner).await
    }

    async fn list(&self, kind: CollectionKind, owner: Uuid) -> DomainResult<Vec<CollectionView>> {
        let collections = self.collections.list(kind, owner).await?;
        let mut views = Vec::with_capacity(collections.len());
        for collection in collections {
            views.push(self.documents.expand_collection(collection).await?);
        }
        Ok(views)
    }

    /// Every new document starts with one empty text block.
    pub async fn create_page(&self, owner: Uuid, input: CreatePage) -> DomainResult<DocumentView> {
        let title = non_blank(input.title).unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string());

        let document = match input.parent {
            None => {
                let mut collection = Collection::new(title, owner);
                let block = Block::default_text(collection.id);
                collection.pages.push(block.id);
                self.collections
                    .insert(CollectionKind::OtherPage, &collection, &[block])
                    .await?;
                Document::Collection(CollectionKind::OtherPage, collection)
            }
            Some(parent) => {
                self.require_layer(parent, owner).await?;
                let mut page = Page::new(title, owner, parent);
                let block = Block::default_text(page.id);
                page.blocks.push(block.id);
                self.pages.insert(&page, &[block]).await?;
                Document::Page(page)
            }
        };
        info!(owner = %owner, page_id = %document.id(), "created page");
        self.documents.expand(document).await
    }

    pub async fn get_page(&self, owner: Uuid, id: Uuid) -> DomainResult<DocumentView> {
        let document = self.locate(owner, id).await?;
        self.documents.expand(document).await
    }

    pub async fn update_page(&self, owner: Uuid, id: Uuid, update: PageUpdate) -> DomainResult<DocumentView> {
        let document = self.locate(owner, id).await?;
        let title = non_blank(update.title);

        if let Some(content) = update.content.filter(|c| !c.is_empty()) {
            if let Some(first) = document.children().first() {
                if let Some(mut block) = self.blocks.find(*first).await? {
                    block.content = content;
                    self.blocks.update(&block).await?;
                }
            }
        }

        let now = Utc::now();
        let document = match document {
            Document::Collection(kind, mut collection) => {
                if let Some(title) = title {
                    collection.title = title;
                }
                collection.updated_at = now;
                self.collections.update(kind, &collection).await?;
                Document::Collection(kind, collection)
            }
            Document::Page(mut page) => {
                if let Some(title) = title {
                    page.title = title;
                }
                page.updated_at = now;
                page.last_edited_by = Some(owner);
                self.pages.update(&page).await?;
                Document::Page(page)
            }
        };
        self.documents.expand(document).await
    }

    /// Deletion cascades to blocks (and, for collections, to the pages
    /// under them).
    pub async fn delete_page(&self, owner: Uuid, id: Uuid) -> DomainResult<()> {
        let deleted = match self.locate(owner, id).await? {
            Document::Collection(kind, _) => self.collections.delete(kind, id, owner).await?,
            Document::Page(_) => self.pages.delete(id, owner).await?,
        };
        if !deleted {
            return Err(DomainError::not_found("Page", id));
        }
        info!(owner = %owner, page_id = %id, "deleted page");
        Ok(())
    }

    pub async fn layer_pages(&self, owner: Uuid, layer: ParentLayer) -> DomainResult<Vec<PageView>> {
        self.require_layer(layer, owner).await?;
        let pages = self.pages.list_by_layer(layer, owner).await?;
        let mut views = Vec::with_capacity(pages.len());
        for page in pages {
            views.push(self.documents.expand_page(page).await?);
        }
        Ok(views)
    }

    pub async fn move_to_favorites(&self, owner: Uuid, id: Uuid) -> DomainResult<CollectionView> {
        self.relocate(owner, id, CollectionKind::OtherPage).await
    }

    pub async fn move_to_private(&self, owner: Uuid, id: Uuid) -> DomainResult<CollectionView> {
        self.relocate(owner, id, CollectionKind::Favorite).await
    }

    /// Moves a caller-owned document out of `from` into the opposite store,
    /// keeping its id. An empty document gets a default block on the way.
    async fn relocate(&self, owner: Uuid, id: Uuid, from: CollectionKind) -> DomainResult<CollectionView> {
        let to = from.opposite();
        let seed = Block::default_text(id);

        let collection = self
            .collections
            .relocate(id, owner, from, to, &seed)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Page in {from}"), id.to_string()))?;

        info!(owner = %owner, page_id = %id, from = %from, to = %to, "moved page");
        self.documents.expand_collection(collection).await
    }

    async fn locate(&self, owner: Uuid, id: Uuid) -> DomainResult<Document> {
        self.documents
            .locate(id, owner)
            .await?
            .ok_or_else(|| DomainError::not_found("Page", id))
    }

    async fn require_layer(&self, layer: ParentLayer, owner: Uuid) -> DomainResult<Collection> {
        self.collections
            .find(layer.kind(), layer.id(), owner)
            .await?
            .ok_or_else(|| DomainError::not_found(layer.kind().layer_type(), layer.id()))
    }
}
