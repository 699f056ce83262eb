#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use framemark_api::config::{AnnotationBackend, ServerConfig};
use framemark_api::router::build_app_router;
use framemark_api::state::AppState;
use framemark_core::metadata::{StaticMetadataProvider, VideoMetadata};

/// Build a test `ServerConfig` over `videos_dir` with in-memory annotations.
pub fn test_config(videos_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        videos_dir: videos_dir.to_path_buf(),
        annotation_backend: AnnotationBackend::Memory,
        annotations_dir: videos_dir.to_path_buf(),
        ffprobe_bin: "ffprobe".into(),
    }
}

/// Metadata every test video reports.
pub fn test_metadata() -> VideoMetadata {
    VideoMetadata {
        duration: 10.0,
        fps: 30.0,
        width: 1280,
        height: 720,
    }
}

/// Build the full application router with all middleware layers.
///
/// Clone the returned router to send several requests against the same
/// state.
pub fn build_test_app_with(config: ServerConfig) -> Router {
    let state = AppState::with_metadata(config, Arc::new(StaticMetadataProvider(test_metadata())));
    build_app_router(state)
}

pub fn build_test_app(videos_dir: &Path) -> Router {
    build_test_app_with(test_config(videos_dir))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(json)).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(json)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an empty file in `dir`.
pub fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"").unwrap();
}
