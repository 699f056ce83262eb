//! Route definitions for the video listing.
//!
//! Mounted at `/api/videos`. The files themselves are served by the router
//! under `/videos`.

use axum::routing::get;
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(video::list_videos))
}
