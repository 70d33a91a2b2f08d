//! # SQLite store
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `domains` models. One `SqliteStore` implements every
//! repository port over a single pool, so multi-table operations can share
//! a transaction.

mod blocks;
mod collections;
mod pages;
mod users;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use domains::{Block, BlockKind, BlockParent, Collection, CollectionKind, Page, ParentLayer, SubPage};
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database with default pool settings and applies migrations.
    pub async fn new(url: &str) -> StorageResult<Self> {
        Self::connect(url, 5).await
    }

    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty
        // database, so those pools are pinned to a single long-lived one.
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(url, "sqlite store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn collection_table(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Favorite => "favorites",
        CollectionKind::OtherPage => "other_pages",
    }
}

/// A JSON id-list column on some table.
#[derive(Debug, Clone, Copy)]
struct IdList {
    table: &'static str,
    column: &'static str,
}

impl IdList {
    const fn collection_blocks(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Favorite => IdList { table: "favorites", column: "pages" },
            CollectionKind::OtherPage => IdList { table: "other_pages", column: "pages" },
        }
    }

    const PAGE_BLOCKS: IdList = IdList { table: "pages", column: "blocks" };

    /// Every list a block id can appear in.
    const ALL_BLOCK_LISTS: [IdList; 3] = [
        IdList::collection_blocks(CollectionKind::OtherPage),
        IdList::collection_blocks(CollectionKind::Favorite),
        IdList::PAGE_BLOCKS,
    ];

    fn for_parent(parent: BlockParent) -> (Self, Uuid) {
        match parent {
            BlockParent::Collection(kind, id) => (IdList::collection_blocks(kind), id),
            BlockParent::Page(id) => (IdList::PAGE_BLOCKS, id),
        }
    }

    async fn read(&self, conn: &mut SqliteConnection, owner_row: Uuid) -> StorageResult<Option<Vec<Uuid>>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", self.column, self.table);
        let raw: Option<String> = sqlx::query_scalar(&sql)
            .bind(owner_row.to_string())
            .fetch_optional(&mut *conn)
            .await?;
        raw.map(|raw| from_json(self.table, &raw)).transpose()
    }

    async fn write(&self, conn: &mut SqliteConnection, owner_row: Uuid, ids: &[Uuid]) -> StorageResult<()> {
        let sql = format!("UPDATE {} SET {} = ? WHERE id = ?", self.table, self.column);
        sqlx::query(&sql)
            .bind(serde_json::to_string(ids)?)
            .bind(owner_row.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Appends `id` unless the list already holds it.
    async fn append(&self, conn: &mut SqliteConnection, owner_row: Uuid, id: Uuid) -> StorageResult<bool> {
        let Some(mut ids) = self.read(conn, owner_row).await? else {
            return Ok(false);
        };
        if !ids.contains(&id) {
            ids.push(id);
            self.write(conn, owner_row, &ids).await?;
        }
        Ok(true)
    }

    /// Removes `id` from every row of this table whose list contains it.
    async fn pull_everywhere(&self, conn: &mut SqliteConnection, id: Uuid) -> StorageResult<()> {
        let sql = format!(
            "SELECT id, {col} FROM {tbl} WHERE EXISTS (SELECT 1 FROM json_each({tbl}.{col}) WHERE json_each.value = ?)",
            col = self.column,
            tbl = self.table,
        );
        let rows = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_all(&mut *conn)
            .await?;

        for row in rows {
            let row_id = parse_uuid(self.table, &row.try_get::<String, _>("id")?)?;
            let mut ids: Vec<Uuid> = from_json(self.table, &row.try_get::<String, _>(self.column)?)?;
            ids.retain(|existing| *existing != id);
            self.write(conn, row_id, &ids).await?;
        }
        Ok(())
    }
}

// Helper for UUID conversion
fn parse_uuid(table: &'static str, raw: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(raw).map_err(|err| StorageError::CorruptRecord {
        table,
        details: format!("invalid id '{raw}': {err}"),
    })
}

fn from_json<T: DeserializeOwned>(table: &'static str, raw: &str) -> StorageResult<T> {
    serde_json::from_str(raw).map_err(|err| StorageError::CorruptRecord {
        table,
        details: format!("invalid JSON list: {err}"),
    })
}

fn collection_from_row(table: &'static str, row: &SqliteRow) -> StorageResult<Collection> {
    Ok(Collection {
        id: parse_uuid(table, &row.try_get::<String, _>("id")?)?,
        title: row.try_get("title")?,
        owner_id: parse_uuid(table, &row.try_get::<String, _>("owner_id")?)?,
        pages: from_json(table, &row.try_get::<String, _>("pages")?)?,
        sub_pages: from_json::<Vec<SubPage>>(table, &row.try_get::<String, _>("sub_pages")?)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn page_from_row(row: &SqliteRow) -> StorageResult<Page> {
    const TABLE: &str = "pages";
    let layer_type: String = row.try_get("layer_type")?;
    let kind = CollectionKind::from_str(&layer_type).map_err(|err| StorageError::CorruptRecord {
        table: TABLE,
        details: err.to_string(),
    })?;
    let last_edited_by: Option<String> = row.try_get("last_edited_by")?;

    Ok(Page {
        id: parse_uuid(TABLE, &row.try_get::<String, _>("id")?)?,
        title: row.try_get("title")?,
        owner_id: parse_uuid(TABLE, &row.try_get::<String, _>("owner_id")?)?,
        parent: ParentLayer::new(kind, parse_uuid(TABLE, &row.try_get::<String, _>("layer_id")?)?),
        blocks: from_json(TABLE, &row.try_get::<String, _>("blocks")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_edited_by: last_edited_by.map(|raw| parse_uuid(TABLE, &raw)).transpose()?,
    })
}

fn block_from_row(row: &SqliteRow) -> StorageResult<Block> {
    const TABLE: &str = "blocks";
    let kind: String = row.try_get("kind")?;
    Ok(Block {
        id: parse_uuid(TABLE, &row.try_get::<String, _>("id")?)?,
        page_id: parse_uuid(TABLE, &row.try_get::<String, _>("page_id")?)?,
        kind: BlockKind::from_str(&kind).map_err(|err| StorageError::CorruptRecord {
            table: TABLE,
            details: err.to_string(),
        })?,
        content: row.try_get("content")?,
        position: row.try_get("position")?,
        created_at: row.try_get("created_at")?,
    })
}

async fn insert_block(conn: &mut SqliteConnection, block: &Block) -> StorageResult<()> {
    sqlx::query("INSERT INTO blocks (id, page_id, kind, content, position, created_at) VALUES (?, ?, ?, ?, ?, ?)")
        .bind(block.id.to_string())
        .bind(block.page_id.to_string())
        .bind(block.kind.as_str())
        .bind(&block.content)
        .bind(block.position)
        .bind(block.created_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_collection(conn: &mut SqliteConnection, kind: CollectionKind, collection: &Collection) -> StorageResult<()> {
    let sql = format!(
        "INSERT INTO {} (id, title, owner_id, pages, sub_pages, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        collection_table(kind)
    );
    sqlx::query(&sql)
        .bind(collection.id.to_string())
        .bind(&collection.title)
        .bind(collection.owner_id.to_string())
        .bind(serde_json::to_string(&collection.pages)?)
        .bind(serde_json::to_string(&collection.sub_pages)?)
        .bind(collection.created_at)
        .bind(collection.updated_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn read_sub_pages(conn: &mut SqliteConnection, layer: ParentLayer) -> StorageResult<Option<Vec<SubPage>>> {
    let table = collection_table(layer.kind());
    let sql = format!("SELECT sub_pages FROM {table} WHERE id = ?");
    let raw: Option<String> = sqlx::query_scalar(&sql)
        .bind(layer.id().to_string())
        .fetch_optional(&mut *conn)
        .await?;
    raw.map(|raw| from_json(table, &raw)).transpose()
}

async fn write_sub_pages(conn: &mut SqliteConnection, layer: ParentLayer, sub_pages: &[SubPage]) -> StorageResult<()> {
    let sql = format!("UPDATE {} SET sub_pages = ? WHERE id = ?", collection_table(layer.kind()));
    sqlx::query(&sql)
        .bind(serde_json::to_string(sub_pages)?)
        .bind(layer.id().to_string())
        .execute(&mut *conn)
        .await?;
    Ok(())
}
