//! End-to-end tests: a review session talking to a live API server through
//! the HTTP store and catalog.

use std::path::Path;
use std::sync::Arc;

use assert_matches::assert_matches;
use framemark_api::config::ServerConfig;
use framemark_api::router::build_app_router;
use framemark_api::state::AppState;
use framemark_core::annotation::{AnnotationPatch, NewAnnotation};
use framemark_core::error::StoreError;
use framemark_core::metadata::{StaticMetadataProvider, VideoMetadata};
use framemark_core::range::FrameRange;
use framemark_core::store::AnnotationStore;
use framemark_core::video::VideoCatalog;
use framemark_events::EventBus;
use framemark_session::{ApiClient, HttpAnnotationStore, HttpVideoCatalog, ReviewSession};

/// Serve the API over `videos_dir` on an ephemeral port and return its base
/// URL.
async fn start_server(videos_dir: &Path) -> String {
    let mut config = ServerConfig::from_vars(|_| None).unwrap();
    config.host = "127.0.0.1".into();
    config.videos_dir = videos_dir.to_path_buf();
    config.annotations_dir = videos_dir.to_path_buf();

    let metadata = VideoMetadata {
        duration: 10.0,
        fps: 30.0,
        ..VideoMetadata::default()
    };
    let state = AppState::with_metadata(config, Arc::new(StaticMetadataProvider(metadata)));
    let app = build_app_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn range(start: i64, end: i64) -> FrameRange {
    FrameRange {
        start_frame: start,
        end_frame: end,
    }
}

#[tokio::test]
async fn http_store_crud_against_server() {
    let dir = tempfile::tempdir().unwrap();
    let store = HttpAnnotationStore::new(ApiClient::new(start_server(dir.path()).await));

    let created = store.create("clip", NewAnnotation::empty(range(30, 60), 1.0)).await.unwrap();
    assert_eq!(created.video_id, "clip");
    assert_eq!(created.rating, 3);

    let updated = store
        .update("clip", &created.id, AnnotationPatch::tags(vec!["pose".into()]))
        .await
        .unwrap();
    assert_eq!(updated.tags, vec!["pose".to_string()]);

    assert_eq!(store.list("clip").await.unwrap(), vec![updated]);

    store.delete("clip", &created.id).await.unwrap();
    assert!(store.list("clip").await.unwrap().is_empty());
}

#[tokio::test]
async fn ids_needing_escapes_reach_the_right_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = HttpAnnotationStore::new(ApiClient::new(start_server(dir.path()).await));

    for video_id in ["take#2", "50% speed?", "take..2"] {
        let created = store
            .create(video_id, NewAnnotation::empty(range(0, 10), 0.0))
            .await
            .unwrap();
        assert_eq!(created.video_id, video_id);

        let updated = store
            .update(video_id, &created.id, AnnotationPatch::rating(5))
            .await
            .unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(store.list(video_id).await.unwrap(), vec![updated]);
        assert!(dir.path().join(format!("{video_id}.txt")).exists());
    }
    assert!(!dir.path().join("take.txt").exists());
}

#[tokio::test]
async fn http_store_maps_error_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let store = HttpAnnotationStore::new(ApiClient::new(start_server(dir.path()).await));

    let err = store
        .update("clip", "missing", AnnotationPatch::rating(2))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::NotFound { ref video_id, ref id } if video_id == "clip" && id == "missing");

    let err = store
        .create("clip", NewAnnotation::empty(range(10, 5), 0.0))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Validation(_));
}

#[tokio::test]
async fn http_catalog_lists_videos() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.mp4"), b"").unwrap();
    let catalog = HttpVideoCatalog::new(ApiClient::new(start_server(dir.path()).await));

    let videos = catalog.list_videos().await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].id, "clip");
    assert_eq!(videos[0].metadata.duration, 10.0);
}

#[tokio::test]
async fn session_edits_persist_on_server() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.mp4"), b"").unwrap();
    let api = ApiClient::new(start_server(dir.path()).await);

    let mut session = ReviewSession::new(
        Arc::new(HttpVideoCatalog::new(api.clone())),
        Arc::new(HttpAnnotationStore::new(api.clone())),
        Arc::new(EventBus::default()),
    );
    session.load_videos().await.unwrap();
    session.set_range(range(30, 60));
    session.add_tag("pose").await.unwrap();
    session.set_rating(5).await.unwrap();

    // The file backend wrote the record next to the video.
    assert!(dir.path().join("clip.txt").exists());

    let mut fresh = ReviewSession::new(
        Arc::new(HttpVideoCatalog::new(api.clone())),
        Arc::new(HttpAnnotationStore::new(api)),
        Arc::new(EventBus::default()),
    );
    fresh.load_videos().await.unwrap();
    fresh.set_range(range(30, 60));
    assert_eq!(fresh.tags(), ["pose".to_string()]);
    assert_eq!(fresh.rating(), 5);
    assert_eq!(fresh.videos()[0].stats.annotation_count, 1);
}
