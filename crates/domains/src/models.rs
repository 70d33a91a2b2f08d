//! # Domain Models
//!
//! These structs represent the core entities of NotY.
//! We use UUID v7 for time-ordered, globally unique identification, so a
//! document keeps its identity when it moves between collection stores.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Unique across all users
    pub email: String,
    /// Argon2 PHC string, never sent to clients
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The two per-user collection stores. "Starred" status is a storage
/// location, not a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Favorite,
    OtherPage,
}

impl CollectionKind {
    /// Probe order used by every lookup-by-id.
    pub const PROBE_ORDER: [CollectionKind; 2] = [CollectionKind::OtherPage, CollectionKind::Favorite];

    pub fn layer_type(self) -> &'static str {
        match self {
            CollectionKind::Favorite => "Favorite",
            CollectionKind::OtherPage => "OtherPage",
        }
    }

    pub fn source(self) -> DocumentSource {
        match self {
            CollectionKind::Favorite => DocumentSource::Favorites,
            CollectionKind::OtherPage => DocumentSource::OtherPages,
        }
    }

    /// The store a document lands in when it is moved out of this one.
    pub fn opposite(self) -> Self {
        match self {
            CollectionKind::Favorite => CollectionKind::OtherPage,
            CollectionKind::OtherPage => CollectionKind::Favorite,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.layer_type())
    }
}

impl FromStr for CollectionKind {
    type Err = DomainError;

    /// Accepts the layer type names and the plural source tags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "favorite" | "favorites" => Ok(CollectionKind::Favorite),
            "otherpage" | "otherpages" => Ok(CollectionKind::OtherPage),
            _ => Err(DomainError::ValidationError(format!("Unknown layer type '{s}'"))),
        }
    }
}

/// Denormalized title of a Page document living under a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPage {
    pub id: Uuid,
    pub title: String,
}

/// A Favorite or OtherPage document. Both stores share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    /// Ordered references to blocks
    pub pages: Vec<Uuid>,
    pub sub_pages: Vec<SubPage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(title: impl Into<String>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            owner_id,
            pages: Vec::new(),
            sub_pages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Polymorphic parent of a Page document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layerType", content = "parentLayer")]
pub enum ParentLayer {
    Favorite(Uuid),
    OtherPage(Uuid),
}

impl ParentLayer {
    pub fn new(kind: CollectionKind, id: Uuid) -> Self {
        match kind {
            CollectionKind::Favorite => ParentLayer::Favorite(id),
            CollectionKind::OtherPage => ParentLayer::OtherPage(id),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            ParentLayer::Favorite(_) => CollectionKind::Favorite,
            ParentLayer::OtherPage(_) => CollectionKind::OtherPage,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ParentLayer::Favorite(id) | ParentLayer::OtherPage(id) => *id,
        }
    }
}

/// A normalized page living under one of the caller's collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub parent: ParentLayer,
    /// Ordered references to blocks
    pub blocks: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_edited_by: Option<Uuid>,
}

impl Page {
    pub fn new(title: impl Into<String>, owner_id: Uuid, parent: ParentLayer) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            owner_id,
            parent,
            blocks: Vec::new(),
            created_at: now,
            updated_at: now,
            last_edited_by: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
    Video,
    Audio,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Video => "video",
            BlockKind::Audio => "audio",
        }
    }
}

impl FromStr for BlockKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(BlockKind::Text),
            "image" => Ok(BlockKind::Image),
            "video" => Ok(BlockKind::Video),
            "audio" => Ok(BlockKind::Audio),
            other => Err(DomainError::ValidationError(format!("Unknown block type '{other}'"))),
        }
    }
}

/// A single typed content fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: Uuid,
    /// The collection or Page document that lists this block
    pub page_id: Uuid,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// HTML / rich text, or a media URL for non-text blocks
    pub content: String,
    /// Ordering key. Gaps and duplicates are allowed.
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl Block {
    pub fn new(page_id: Uuid, kind: BlockKind, content: impl Into<String>, position: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            page_id,
            kind,
            content: content.into(),
            position,
            created_at: Utc::now(),
        }
    }

    /// The empty text block every fresh page starts with.
    pub fn default_text(page_id: Uuid) -> Self {
        Self::new(page_id, BlockKind::Text, "", 0)
    }
}

/// Where a block's id is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockParent {
    Collection(CollectionKind, Uuid),
    Page(Uuid),
}

/// The store a lookup-by-id found a document in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    OtherPages,
    Favorites,
    Pages,
}

/// A document found by id, before its children are resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Collection(CollectionKind, Collection),
    Page(Page),
}

impl Document {
    pub fn id(&self) -> Uuid {
        match self {
            Document::Collection(_, c) => c.id,
            Document::Page(p) => p.id,
        }
    }

    pub fn source(&self) -> DocumentSource {
        match self {
            Document::Collection(kind, _) => kind.source(),
            Document::Page(_) => DocumentSource::Pages,
        }
    }

    pub fn children(&self) -> &[Uuid] {
        match self {
            Document::Collection(_, c) => &c.pages,
            Document::Page(p) => &p.blocks,
        }
    }

    pub fn as_block_parent(&self) -> BlockParent {
        match self {
            Document::Collection(kind, c) => BlockParent::Collection(*kind, c.id),
            Document::Page(p) => BlockParent::Page(p.id),
        }
    }
}

/// A collection with its block references resolved inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionView {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub pages: Vec<Block>,
    pub sub_pages: Vec<SubPage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CollectionView {
    pub fn new(collection: Collection, pages: Vec<Block>) -> Self {
        Self {
            id: collection.id,
            title: collection.title,
            owner_id: collection.owner_id,
            pages,
            sub_pages: collection.sub_pages,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}

/// A Page document with its block references resolved inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub parent: ParentLayer,
    pub blocks: Vec<Block>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_edited_by: Option<Uuid>,
}

impl PageView {
    pub fn new(page: Page, blocks: Vec<Block>) -> Self {
        Self {
            id: page.id,
            title: page.title,
            owner_id: page.owner_id,
            parent: page.parent,
            blocks,
            created_at: page.created_at,
            updated_at: page.updated_at,
            last_edited_by: page.last_edited_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentBody {
    Collection(CollectionView),
    Page(PageView),
}

/// An expanded document tagged with the store it came from, so clients can
/// target the right store on later mutations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub body: DocumentBody,
    pub source: DocumentSource,
}

impl DocumentView {
    pub fn id(&self) -> Uuid {
        match &self.body {
            DocumentBody::Collection(c) => c.id,
            DocumentBody::Page(p) => p.id,
        }
    }

    pub fn title(&self) -> &str {
        match &self.body {
            DocumentBody::Collection(c) => &c.title,
            DocumentBody::Page(p) => &p.title,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        match &self.body {
            DocumentBody::Collection(c) => &c.pages,
            DocumentBody::Page(p) => &p.blocks,
        }
    }
}
