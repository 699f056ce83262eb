//! Handlers for frame-range annotations.
//!
//! Records are keyed by video id (the file stem); the store assigns ids.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use framemark_core::annotation::{AnnotationPatch, NewAnnotation};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/annotations/{video_id}
pub async fn list_annotations(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let annotations = state.store.list(&video_id).await?;
    Ok(Json(DataResponse { data: annotations }))
}

/// POST /api/annotations/{video_id}
///
/// Create an annotation. Omitted fields default to no tags, empty notes and
/// rating 3.
pub async fn create_annotation(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Json(input): Json<NewAnnotation>,
) -> AppResult<impl IntoResponse> {
    let annotation = state.store.create(&video_id, input).await?;

    tracing::info!(
        video_id = %video_id,
        annotation_id = %annotation.id,
        start_frame = annotation.start_frame,
        end_frame = annotation.end_frame,
        "Annotation created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: annotation })))
}

/// PUT /api/annotations/{video_id}/{annotation_id}
///
/// Merge the present fields into the record.
pub async fn update_annotation(
    State(state): State<AppState>,
    Path((video_id, annotation_id)): Path<(String, String)>,
    Json(patch): Json<AnnotationPatch>,
) -> AppResult<impl IntoResponse> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let annotation = state.store.update(&video_id, &annotation_id, patch).await?;
    Ok(Json(DataResponse { data: annotation }))
}

/// DELETE /api/annotations/{video_id}/{annotation_id}
///
/// Succeeds whether or not the record existed.
pub async fn delete_annotation(
    State(state): State<AppState>,
    Path((video_id, annotation_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state.store.delete(&video_id, &annotation_id).await?;

    tracing::info!(video_id = %video_id, annotation_id = %annotation_id, "Annotation deleted");
    Ok(StatusCode::NO_CONTENT)
}
