/// Domain-level error shared by every framemark crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error returned by [`AnnotationStore`](crate::store::AnnotationStore) and
/// [`VideoCatalog`](crate::video::VideoCatalog) implementations.
///
/// Local backends produce `NotFound`, `Validation`, `Io` and
/// `Serialization`; the HTTP client adds `Transport` and `Status`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Annotation {id} not found for video {video_id}")]
    NotFound { video_id: String, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => StoreError::Validation(msg),
            CoreError::NotFound { id, .. } => StoreError::NotFound {
                video_id: String::new(),
                id,
            },
            CoreError::Internal(msg) => StoreError::Io(std::io::Error::other(msg)),
        }
    }
}
