//! Collections, layer pages and the Favorite/OtherPage move through the
//! HTTP API, backed by SQLite.

use axum::http::{Method, StatusCode};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use integration_tests::{block_ids, str_field, TestApp};
use serde_json::{json, Value};
use services::AuthOptions;
use uuid::Uuid;

async fn app_and_user() -> (TestApp, String) {
    let app = TestApp::with_options(AuthOptions { provision_first_page: false }).await;
    let email: String = SafeEmail().fake();
    let (token, _) = app.register("writer", &email, "hunter22").await;
    (app, token)
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| items.iter().map(|item| str_field(item, "id")).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn new_page_gets_default_title_and_one_empty_block() {
    let (app, token) = app_and_user().await;

    let (status, body) = app.post("/pages/create", &token, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "New Page");
    assert_eq!(body["source"], "otherpages");

    let blocks = body["pages"].as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["type"], "text");
    assert_eq!(blocks[0]["content"], "");
    assert_eq!(blocks[0]["pageId"], body["id"]);
}

#[tokio::test]
async fn move_round_trip_preserves_the_document() {
    let (app, token) = app_and_user().await;
    let id = app.create_page(&token, "Groceries").await;
    let (_, before) = app.get(&format!("/pages/page/{id}"), &token).await;
    assert_eq!(before["source"], "otherpages");

    let (status, moved) = app
        .patch(&format!("/pages/move-to-favorites/{id}"), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["message"], "Page moved to favorites successfully");
    assert_eq!(str_field(&moved["page"], "id"), id);

    let (_, during) = app.get(&format!("/pages/page/{id}"), &token).await;
    assert_eq!(during["source"], "favorites");
    let (_, favorites) = app.get("/pages/favorites", &token).await;
    assert_eq!(ids(&favorites), vec![id.clone()]);
    let (_, others) = app.get("/pages/otherPages", &token).await;
    assert!(ids(&others).is_empty());

    let (status, moved) = app
        .patch(&format!("/pages/move-to-private/{id}"), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["message"], "Page moved to OtherPages successfully");

    let (_, after) = app.get(&format!("/pages/page/{id}"), &token).await;
    assert_eq!(after["source"], "otherpages");
    for field in ["id", "title", "ownerId", "subPages"] {
        assert_eq!(after[field], before[field], "{field} changed across the move");
    }
    assert_eq!(block_ids(&after), block_ids(&before));
}

#[tokio::test]
async fn moving_from_the_wrong_store_is_not_found() {
    let (app, token) = app_and_user().await;
    let id = app.create_page(&token, "Stays put").await;

    let (status, _) = app
        .patch(&format!("/pages/move-to-private/{id}"), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, page) = app.get(&format!("/pages/page/{id}"), &token).await;
    assert_eq!(page["source"], "otherpages");
}

#[tokio::test]
async fn documents_of_other_users_are_invisible() {
    let (app, token) = app_and_user().await;
    let id = app.create_page(&token, "Private").await;
    let (intruder, _) = app.register("intruder", "intruder@example.net", "password1").await;

    let (status, _) = app.get(&format!("/pages/page/{id}"), &intruder).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .patch(&format!("/pages/move-to-favorites/{id}"), &intruder, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/pages/page/{id}"), &intruder).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&format!("/pages/page/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_renames_and_rewrites_the_first_block() {
    let (app, token) = app_and_user().await;
    let id = app.create_page(&token, "Draft").await;

    let (status, body) = app
        .patch(
            &format!("/pages/page/{id}"),
            &token,
            json!({ "title": "Final", "content": "<p>done</p>" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Final");
    assert_eq!(body["pages"][0]["content"], "<p>done</p>");

    let (status, body) = app
        .patch(&format!("/pages/page/{id}"), &token, json!({ "title": "   " }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Final");
}

#[tokio::test]
async fn deleting_an_unknown_id_changes_nothing() {
    let (app, token) = app_and_user().await;
    app.create_page(&token, "Keep me").await;
    let blocks_before = app.count("blocks").await;

    let (status, body) = app.delete(&format!("/pages/page/{}", Uuid::now_v7()), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
    assert_eq!(app.count("other_pages").await, 1);
    assert_eq!(app.count("blocks").await, blocks_before);
}

#[tokio::test]
async fn deleting_a_page_removes_its_blocks() {
    let (app, token) = app_and_user().await;
    let id = app.create_page(&token, "Scratch").await;

    let (status, body) = app.delete(&format!("/pages/page/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Page deleted successfully");

    let (status, _) = app.get(&format!("/pages/page/{id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("blocks").await, 0);
}

#[tokio::test]
async fn layer_pages_live_under_their_collection() {
    let (app, token) = app_and_user().await;
    let parent = app.create_page(&token, "Projects").await;

    let (status, child) = app
        .post(
            "/pages/create",
            &token,
            json!({ "title": "Rewrite", "parentLayer": parent, "layerType": "OtherPage" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(child["source"], "pages");
    assert_eq!(child["layerType"], "OtherPage");
    assert_eq!(child["parentLayer"], parent.as_str());
    let child_id = str_field(&child, "id");

    let (status, listed) = app.get(&format!("/pages/layer/OtherPage/{parent}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&listed), vec![child_id.clone()]);

    let (_, parent_doc) = app.get(&format!("/pages/page/{parent}"), &token).await;
    assert_eq!(parent_doc["subPages"], json!([{ "id": child_id, "title": "Rewrite" }]));

    app.patch(&format!("/pages/page/{child_id}"), &token, json!({ "title": "Rewrite v2" }))
        .await;
    let (_, parent_doc) = app.get(&format!("/pages/page/{parent}"), &token).await;
    assert_eq!(parent_doc["subPages"][0]["title"], "Rewrite v2");
}

#[tokio::test]
async fn layer_pages_follow_their_collection_across_a_move() {
    let (app, token) = app_and_user().await;
    let parent = app.create_page(&token, "Reading list").await;
    let (_, child) = app
        .post(
            "/pages/create",
            &token,
            json!({ "parentLayer": parent, "layerType": "OtherPage" }),
        )
        .await;
    let child_id = str_field(&child, "id");

    app.patch(&format!("/pages/move-to-favorites/{parent}"), &token, json!({}))
        .await;

    let (status, listed) = app.get(&format!("/pages/layer/Favorite/{parent}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&listed), vec![child_id.clone()]);
    let (_, child) = app.get(&format!("/pages/page/{child_id}"), &token).await;
    assert_eq!(child["layerType"], "Favorite");
}

#[tokio::test]
async fn deleting_a_collection_cascades_to_its_pages() {
    let (app, token) = app_and_user().await;
    let parent = app.create_page(&token, "Archive").await;
    let (_, child) = app
        .post(
            "/pages/create",
            &token,
            json!({ "parentLayer": parent, "layerType": "OtherPage" }),
        )
        .await;
    let child_id = str_field(&child, "id");

    let (status, _) = app.delete(&format!("/pages/page/{parent}"), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/pages/page/{child_id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("pages").await, 0);
    assert_eq!(app.count("blocks").await, 0);
}

#[tokio::test]
async fn layer_requests_are_validated() {
    let (app, token) = app_and_user().await;

    let (status, _) = app
        .get(&format!("/pages/layer/Favorite/{}", Uuid::now_v7()), &token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/pages/create",
            &token,
            json!({ "parentLayer": Uuid::now_v7(), "layerType": "Favorite" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/pages/create", &token, json!({ "layerType": "Favorite" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_input_is_a_bad_request() {
    let (app, token) = app_and_user().await;

    let (status, _) = app.get("/pages/page/123", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::POST, "/pages/create", Some(&token), Some(json!("just a string")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::GET, "/pages/favorites", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
