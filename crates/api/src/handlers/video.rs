use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/videos
///
/// Every `.mp4` in the videos directory with metadata and annotation stats.
pub async fn list_videos(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let videos = state.library.list_videos().await?;
    Ok(Json(DataResponse { data: videos }))
}
