//! # ApiError
//!
//! Maps service failures onto HTTP responses. Every error body is JSON
//! `{ "message": ..., "error"?: ... }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Malformed body, path segment or field combination
    #[error("{0}")]
    BadRequest(String),

    /// Missing or non-Bearer credentials
    #[error("{0}")]
    Unauthorized(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let body = |message: String| ErrorBody { message, error: None };
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, body(message)),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, body(message)),
            ApiError::Domain(err) => match err {
                DomainError::NotFound(..) => (StatusCode::NOT_FOUND, body(err.to_string())),
                DomainError::ValidationError(message) | DomainError::Conflict(message) => {
                    (StatusCode::BAD_REQUEST, body(message))
                }
                DomainError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, body(message)),
                DomainError::Internal(detail) => {
                    error!(error = %detail, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody {
                            message: "Internal server error".into(),
                            error: Some(detail),
                        },
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
