use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use framemark_core::error::{CoreError, StoreError};
use serde::Serialize;

/// Error returned by every handler.
///
/// Renders as `{ "error": <message>, "code": <CODE> }` with a matching status.
/// Server-side failures are logged and replaced by a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure reported by an annotation store or the video library.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const SANITIZED: &str = "An internal error occurred";

impl AppError {
    /// Status, machine-readable code and client-facing message.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            AppError::Core(CoreError::Validation(msg))
            | AppError::Store(StoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Store(StoreError::NotFound { video_id, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Annotation with id {id} not found for video {video_id}"),
            ),
            AppError::Store(StoreError::Transport(_) | StoreError::Status { .. }) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "An upstream service failed".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Core(CoreError::Internal(_))
            | AppError::Store(StoreError::Io(_) | StoreError::Serialization(_))
            | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                SANITIZED.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        }
        (status, Json(ErrorBody { error, code })).into_response()
    }
}
