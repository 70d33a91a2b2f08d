use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use domains::DomainError;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;

pub async fn root() -> &'static str {
    "API is running..."
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state
        .metrics
        .encode()
        .map_err(|err| DomainError::Internal(format!("metrics encoding failed: {err}")))?;
    Ok(([(CONTENT_TYPE, metrics::CONTENT_TYPE)], body))
}
