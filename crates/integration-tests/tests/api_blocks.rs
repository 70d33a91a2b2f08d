//! Block creation, editing and deletion through the HTTP API.

use axum::http::StatusCode;
use integration_tests::{block_ids, str_field, TestApp};
use serde_json::json;
use services::AuthOptions;
use uuid::Uuid;

async fn app_with_page() -> (TestApp, String, String) {
    let app = TestApp::with_options(AuthOptions { provision_first_page: false }).await;
    let (token, _) = app.register("editor", "editor@example.com", "s3cret-pass").await;
    let page = app.create_page(&token, "Notes").await;
    (app, token, page)
}

#[tokio::test]
async fn created_block_is_listed_exactly_once() {
    let (app, token, page) = app_with_page().await;

    let (status, block) = app
        .post(
            "/pages/block",
            &token,
            json!({ "pageId": page, "type": "image", "content": "https://cdn/x.png", "position": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(block["type"], "image");
    assert_eq!(block["position"], 3);
    assert_eq!(block["pageId"], page.as_str());
    let block_id = str_field(&block, "id");

    let (_, document) = app.get(&format!("/pages/page/{page}"), &token).await;
    let listed = block_ids(&document);
    assert_eq!(listed.len(), 2);
    assert_eq!(listed.iter().filter(|id| **id == block_id).count(), 1);
    assert_eq!(listed.last(), Some(&block_id));
}

#[tokio::test]
async fn blocks_can_be_added_to_layer_pages() {
    let (app, token, page) = app_with_page().await;
    let (_, child) = app
        .post(
            "/pages/create",
            &token,
            json!({ "parentLayer": page, "layerType": "OtherPage" }),
        )
        .await;
    let child_id = str_field(&child, "id");

    let (status, _) = app
        .post("/pages/block", &token, json!({ "pageId": child_id, "type": "text", "content": "hi" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, child) = app.get(&format!("/pages/page/{child_id}"), &token).await;
    assert_eq!(child["blocks"].as_array().unwrap().len(), 2);
    assert_eq!(child["blocks"][1]["content"], "hi");
}

#[tokio::test]
async fn block_update_is_partial() {
    let (app, token, page) = app_with_page().await;
    let (_, block) = app
        .post("/pages/block", &token, json!({ "pageId": page, "type": "text", "content": "a", "position": 1 }))
        .await;
    let block_id = str_field(&block, "id");

    let (status, updated) = app
        .patch(&format!("/pages/block/{block_id}"), &token, json!({ "position": 7 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["position"], 7);
    assert_eq!(updated["content"], "a");

    let (_, updated) = app
        .patch(&format!("/pages/block/{block_id}"), &token, json!({ "content": "b" }))
        .await;
    assert_eq!(updated["position"], 7);
    assert_eq!(updated["content"], "b");
}

#[tokio::test]
async fn deleted_block_disappears_from_its_page() {
    let (app, token, page) = app_with_page().await;
    let (_, block) = app
        .post("/pages/block", &token, json!({ "pageId": page, "type": "audio" }))
        .await;
    let block_id = str_field(&block, "id");

    let (status, body) = app.delete(&format!("/pages/block/{block_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Block deleted successfully");

    let (_, document) = app.get(&format!("/pages/page/{page}"), &token).await;
    assert!(!block_ids(&document).contains(&block_id));

    let (status, _) = app.delete(&format!("/pages/block/{block_id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blocks_of_other_users_are_untouchable() {
    let (app, token, page) = app_with_page().await;
    let (_, block) = app
        .post("/pages/block", &token, json!({ "pageId": page, "type": "text", "content": "mine" }))
        .await;
    let block_id = str_field(&block, "id");
    let (intruder, _) = app.register("intruder", "intruder@example.com", "password1").await;

    let (status, _) = app
        .post("/pages/block", &intruder, json!({ "pageId": page, "type": "text" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .patch(&format!("/pages/block/{block_id}"), &intruder, json!({ "content": "yours" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/pages/block/{block_id}"), &intruder).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn block_requests_are_validated() {
    let (app, token, page) = app_with_page().await;

    let (status, _) = app
        .post("/pages/block", &token, json!({ "type": "text" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/pages/block", &token, json!({ "pageId": page, "type": "gif" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/pages/block", &token, json!({ "pageId": Uuid::now_v7(), "type": "text" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch(&format!("/pages/block/{}", Uuid::now_v7()), &token, json!({ "content": "x" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
