//! Annotation persistence contract.
//!
//! Implemented by the in-memory and JSON-file backends in
//! `framemark-store` and by the HTTP client in `framemark-session`.

use async_trait::async_trait;

use crate::annotation::{Annotation, AnnotationPatch, NewAnnotation};
use crate::error::StoreError;

/// CRUD over annotation records, keyed by video id.
///
/// Records are returned in insertion order. Implementations assign the
/// `id` of created records.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// All annotations of a video. Unknown videos have none.
    async fn list(&self, video_id: &str) -> Result<Vec<Annotation>, StoreError>;

    /// Persist a new annotation and return it with its assigned id.
    async fn create(&self, video_id: &str, input: NewAnnotation) -> Result<Annotation, StoreError>;

    /// Merge `patch` into an existing annotation and return the result.
    ///
    /// Fails with [`StoreError::NotFound`] when the id does not exist.
    async fn update(
        &self,
        video_id: &str,
        id: &str,
        patch: AnnotationPatch,
    ) -> Result<Annotation, StoreError>;

    /// Remove an annotation. Removing an unknown id succeeds.
    async fn delete(&self, video_id: &str, id: &str) -> Result<(), StoreError>;
}
