//! `/pages` document handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{CollectionKind, CollectionView, DocumentView, PageView, ParentLayer};
use serde::{Deserialize, Serialize};
use services::{CreatePage, PageUpdate};
use uuid::Uuid;

use super::Message;
use crate::error::{ApiError, ApiResult};
use crate::extract::{parse_id, AuthUser, JsonBody};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    pub title: Option<String>,
    /// Id of the collection the new Page lives under
    pub parent_layer: Option<Uuid>,
    pub layer_type: Option<String>,
}

impl CreatePageRequest {
    fn into_input(self) -> ApiResult<CreatePage> {
        let parent = match (self.parent_layer, self.layer_type) {
            (None, None) => None,
            (Some(id), Some(layer_type)) => Some(ParentLayer::new(layer_type.parse::<CollectionKind>()?, id)),
            _ => {
                return Err(ApiError::BadRequest(
                    "parentLayer and layerType must be given together".into(),
                ))
            }
        };
        Ok(CreatePage { title: self.title, parent })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub message: &'static str,
    pub page: CollectionView,
}

pub async fn favorites(State(state): State<AppState>, AuthUser(owner): AuthUser) -> ApiResult<Json<Vec<CollectionView>>> {
    Ok(Json(state.pages.favorites(owner).await?))
}

pub async fn other_pages(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> ApiResult<Json<Vec<CollectionView>>> {
    Ok(Json(state.pages.other_pages(owner).await?))
}

pub async fn create_page(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    JsonBody(body): JsonBody<CreatePageRequest>,
) -> ApiResult<(StatusCode, Json<DocumentView>)> {
    let document = state.pages.create_page(owner, body.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn get_page(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DocumentView>> {
    Ok(Json(state.pages.get_page(owner, parse_id(&id)?).await?))
}

pub async fn update_page(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdatePageRequest>,
) -> ApiResult<Json<DocumentView>> {
    let update = PageUpdate {
        title: body.title,
        content: body.content,
    };
    Ok(Json(state.pages.update_page(owner, parse_id(&id)?, update).await?))
}

pub async fn delete_page(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    state.pages.delete_page(owner, parse_id(&id)?).await?;
    Ok(Json(Message::new("Page deleted successfully")))
}

pub async fn layer_pages(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path((layer_type, layer_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<PageView>>> {
    let layer = ParentLayer::new(layer_type.parse::<CollectionKind>()?, parse_id(&layer_id)?);
    Ok(Json(state.pages.layer_pages(owner, layer).await?))
}

pub async fn move_to_favorites(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MoveResponse>> {
    let page = state.pages.move_to_favorites(owner, parse_id(&id)?).await?;
    Ok(Json(MoveResponse {
        message: "Page moved to favorites successfully",
        page,
    }))
}

pub async fn move_to_private(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MoveResponse>> {
    let page = state.pages.move_to_private(owner, parse_id(&id)?).await?;
    Ok(Json(MoveResponse {
        message: "Page moved to OtherPages successfully",
        page,
    }))
}
