//! Route definitions for annotations.
//!
//! Mounted at `/api/annotations`.
//!
//! ```text
//! GET    /{video_id}                       list_annotations
//! POST   /{video_id}                       create_annotation
//! PUT    /{video_id}/{annotation_id}       update_annotation
//! DELETE /{video_id}/{annotation_id}       delete_annotation
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{video_id}",
            get(annotation::list_annotations).post(annotation::create_annotation),
        )
        .route(
            "/{video_id}/{annotation_id}",
            put(annotation::update_annotation).delete(annotation::delete_annotation),
        )
}
