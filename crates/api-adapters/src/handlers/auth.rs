//! `/auth` handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use services::RegisterInput;
use uuid::Uuid;

use super::Message;
use crate::error::ApiResult;
use crate::extract::{AuthUser, BearerToken, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let session = state
        .auth
        .register(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: session.user.id,
            username: session.user.username,
            email: session.user.email,
            token: session.token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let session = state.auth.login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        id: session.user.id,
        email: session.user.email,
        token: session.token,
    }))
}

pub async fn profile(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> ApiResult<Json<ProfileResponse>> {
    let user = state.auth.profile(user_id).await?;
    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}

/// 404 once the token's user no longer exists.
pub async fn validate_token(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<Message>> {
    state.auth.validate_token(&token).await?;
    Ok(Json(Message::new("Token is valid")))
}
