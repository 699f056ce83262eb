pub mod annotation;
pub mod health;
pub mod video;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /videos                                      list
/// /annotations/{video_id}                      list, create
/// /annotations/{video_id}/{annotation_id}      update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/videos", video::router())
        .nest("/annotations", annotation::router())
}
