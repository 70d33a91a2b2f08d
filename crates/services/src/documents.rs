//! Lookup-by-id across the three document stores, and child expansion.

use std::sync::Arc;

use domains::{
    Collection, CollectionKind, CollectionRepository, CollectionView, Document, DocumentBody, DocumentView,
    DomainResult, Page, PageRepository, PageView, BlockRepository,
};
use uuid::Uuid;

/// Finds documents wherever they live and resolves their block references.
#[derive(Clone)]
pub struct DocumentLocator {
    collections: Arc<dyn CollectionRepository>,
    pages: Arc<dyn PageRepository>,
    blocks: Arc<dyn BlockRepository>,
}

impl DocumentLocator {
    pub fn new(
        collections: Arc<dyn CollectionRepository>,
        pages: Arc<dyn PageRepository>,
        blocks: Arc<dyn BlockRepository>,
    ) -> Self {
        Self { collections, pages, blocks }
    }

    /// Probes OtherPage, then Favorite, then the Page store. No global index
    /// unifies them, so the first hit wins.
    pub async fn locate(&self, id: Uuid, owner: Uuid) -> DomainResult<Option<Document>> {
        for kind in CollectionKind::PROBE_ORDER {
            if let Some(collection) = self.collections.find(kind, id, owner).await? {
                return Ok(Some(Document::Collection(kind, collection)));
            }
        }
        Ok(self.pages.find(id, owner).await?.map(Document::Page))
    }

    pub async fn expand(&self, document: Document) -> DomainResult<DocumentView> {
        let source = document.source();
        let body = match document {
            Document::Collection(_, collection) => DocumentBody::Collection(self.expand_collection(collection).await?),
            Document::Page(page) => DocumentBody::Page(self.expand_page(page).await?),
        };
        Ok(DocumentView { body, source })
    }

    pub async fn expand_collection(&self, collection: Collection) -> DomainResult<CollectionView> {
        let blocks = self.blocks.find_many(&collection.pages).await?;
        Ok(CollectionView::new(collection, blocks))
    }

    pub async fn expand_page(&self, page: Page) -> DomainResult<PageView> {
        let blocks = self.blocks.find_many(&page.blocks).await?;
        Ok(PageView::new(page, blocks))
    }
}
