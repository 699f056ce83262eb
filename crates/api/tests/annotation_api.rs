//! HTTP-level integration tests for the annotation endpoints.
//!
//! Uses `tower::ServiceExt` to send requests directly to the router
//! without a TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use serde_json::json;

async fn create(app: &axum::Router, video_id: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(app.clone(), &format!("/api/annotations/{video_id}"), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Create / list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_annotation_returns_201_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());

    let data = create(&app, "clip", json!({"startFrame": 30, "endFrame": 60})).await;

    assert!(data["id"].is_string());
    assert_eq!(data["videoId"], "clip");
    assert_eq!(data["startFrame"], 30);
    assert_eq!(data["endFrame"], 60);
    assert_eq!(data["rating"], 3);
    assert_eq!(data["tags"], json!([]));
    assert_eq!(data["notes"], "");
}

#[tokio::test]
async fn test_list_returns_created_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());

    let a = create(&app, "clip", json!({"startFrame": 0, "endFrame": 10})).await;
    let b = create(&app, "clip", json!({"startFrame": 30, "endFrame": 60, "tags": ["pose"]})).await;
    create(&app, "other", json!({"startFrame": 0, "endFrame": 1})).await;

    let response = get(app, "/api/annotations/clip").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let list = json["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], a["id"]);
    assert_eq!(list[1]["id"], b["id"]);
    assert_eq!(list[1]["tags"], json!(["pose"]));
}

#[tokio::test]
async fn test_list_unknown_video_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let json = body_json(get(app, "/api/annotations/nothing").await).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn test_create_rejects_inverted_range() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = post_json(app, "/api/annotations/clip", json!({"startFrame": 60, "endFrame": 30})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_rejects_out_of_range_rating() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = post_json(
        app,
        "/api/annotations/clip",
        json!({"startFrame": 0, "endFrame": 10, "rating": 9}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_with_missing_fields_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = post_json(app, "/api/annotations/clip", json!({"tags": []})).await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_traversal_video_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = get(app, "/api/annotations/..").await;
    assert!(response.status().is_client_error());
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_update_merges_fields() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let created = create(&app, "clip", json!({"startFrame": 0, "endFrame": 10, "notes": "keep"})).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(
        app.clone(),
        &format!("/api/annotations/clip/{id}"),
        json!({"rating": 5, "tags": ["a", " a ", "b"]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["rating"], 5);
    assert_eq!(data["tags"], json!(["a", "b"]));
    assert_eq!(data["notes"], "keep");
    assert_eq!(data["id"], id);
}

#[tokio::test]
async fn test_update_nonexistent_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = put_json(app, "/api/annotations/clip/missing", json!({"rating": 2})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_with_empty_body_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let created = create(&app, "clip", json!({"startFrame": 0, "endFrame": 10})).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(app, &format!("/api/annotations/clip/{id}"), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_returns_204_and_removes() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let created = create(&app, "clip", json!({"startFrame": 0, "endFrame": 10})).await;
    let id = created["id"].as_str().unwrap();

    let response = delete(app.clone(), &format!("/api/annotations/clip/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(app, "/api/annotations/clip").await).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn test_delete_nonexistent_returns_204() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = delete(app, "/api/annotations/clip/missing").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_file_backend_persists_across_app_instances() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.annotation_backend = framemark_api::config::AnnotationBackend::File;

    let app = common::build_test_app_with(config.clone());
    let created = create(&app, "clip", json!({"startFrame": 5, "endFrame": 6})).await;
    assert!(dir.path().join("clip.json").exists());

    let app = common::build_test_app_with(config);
    let json = body_json(get(app, "/api/annotations/clip").await).await;
    assert_eq!(json["data"][0]["id"], created["id"]);
}
