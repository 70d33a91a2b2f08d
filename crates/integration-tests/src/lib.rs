//! Shared harness for the end-to-end API tests: the real router over an
//! in-memory SQLite store with the production auth adapters.

use std::sync::Arc;

use api_adapters::{build_router, AppState, RouterOptions};
use auth_adapters::{Argon2Hasher, JwtTokenProvider};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use services::{AuthOptions, AuthService, BlockService, PageService};
use storage_adapters::SqliteStore;
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(AuthOptions::default()).await
    }

    pub async fn with_options(options: AuthOptions) -> Self {
        let store = Arc::new(
            SqliteStore::new("sqlite::memory:")
                .await
                .expect("in-memory database"),
        );
        let auth = AuthService::new(
            store.clone(),
            store.clone(),
            Arc::new(Argon2Hasher::new()),
            Arc::new(JwtTokenProvider::new(TEST_SECRET, chrono::Duration::days(1))),
            options,
        );
        let pages = PageService::new(store.clone(), store.clone(), store.clone());
        let blocks = BlockService::new(store.clone(), pages.documents().clone());
        let router = build_router(AppState::new(auth, pages, blocks), RouterOptions::default());
        Self { router, store }
    }

    /// Sends one request and returns the status with the body parsed as JSON
    /// (`Value::Null` for empty or non-JSON bodies).
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.router.clone().oneshot(request).await.expect("infallible router");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("readable body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers an account and returns its token and id.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(serde_json::json!({ "username": username, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        (str_field(&body, "token"), str_field(&body, "id"))
    }

    /// Creates a top-level page and returns its id.
    pub async fn create_page(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .post("/pages/create", token, serde_json::json!({ "title": title }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "page creation failed: {body}");
        str_field(&body, "id")
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.store.pool())
            .await
            .expect("count query")
    }
}

pub fn str_field(value: &Value, field: &str) -> String {
    value[field]
        .as_str()
        .unwrap_or_else(|| panic!("missing string field `{field}` in {value}"))
        .to_string()
}

/// Ids of the blocks listed in an expanded document.
pub fn block_ids(document: &Value) -> Vec<String> {
    let list = if document["pages"].is_array() { &document["pages"] } else { &document["blocks"] };
    list.as_array()
        .map(|blocks| blocks.iter().map(|b| str_field(b, "id")).collect())
        .unwrap_or_default()
}
