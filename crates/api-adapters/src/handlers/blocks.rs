//! `/pages/block` handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{Block, BlockKind};
use serde::Deserialize;
use services::{BlockUpdate, NewBlock};
use uuid::Uuid;

use super::Message;
use crate::error::ApiResult;
use crate::extract::{parse_id, AuthUser, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlockRequest {
    pub page_id: Uuid,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: Option<String>,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlockRequest {
    pub content: Option<String>,
    pub position: Option<i64>,
}

pub async fn create_block(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    JsonBody(body): JsonBody<CreateBlockRequest>,
) -> ApiResult<(StatusCode, Json<Block>)> {
    let input = NewBlock {
        page_id: body.page_id,
        kind: body.kind,
        content: body.content,
        position: body.position,
    };
    let block = state.blocks.create_block(owner, input).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn update_block(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateBlockRequest>,
) -> ApiResult<Json<Block>> {
    let update = BlockUpdate {
        content: body.content,
        position: body.position,
    };
    Ok(Json(state.blocks.update_block(owner, parse_id(&id)?, update).await?))
}

pub async fn delete_block(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    state.blocks.delete_block(owner, parse_id(&id)?).await?;
    Ok(Json(Message::new("Block deleted successfully")))
}
