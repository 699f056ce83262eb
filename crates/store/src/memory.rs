//! Volatile annotation store.

use std::collections::HashMap;

use async_trait::async_trait;
use framemark_core::annotation::{validate_video_id, Annotation, AnnotationPatch, NewAnnotation};
use framemark_core::error::StoreError;
use framemark_core::store::AnnotationStore;
use tokio::sync::RwLock;

/// Annotations kept in a map keyed by video id. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryAnnotationStore {
    videos: RwLock<HashMap<String, Vec<Annotation>>>,
}

impl MemoryAnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnnotationStore for MemoryAnnotationStore {
    async fn list(&self, video_id: &str) -> Result<Vec<Annotation>, StoreError> {
        validate_video_id(video_id)?;
        let videos = self.videos.read().await;
        Ok(videos.get(video_id).cloned().unwrap_or_default())
    }

    async fn create(&self, video_id: &str, input: NewAnnotation) -> Result<Annotation, StoreError> {
        validate_video_id(video_id)?;
        let input = input.validated()?;
        let annotation = Annotation::from_new(
            uuid::Uuid::new_v4().to_string(),
            video_id.to_string(),
            input,
        );

        self.videos
            .write()
            .await
            .entry(video_id.to_string())
            .or_default()
            .push(annotation.clone());

        tracing::debug!(video_id, annotation_id = %annotation.id, "Annotation created");
        Ok(annotation)
    }

    async fn update(
        &self,
        video_id: &str,
        id: &str,
        patch: AnnotationPatch,
    ) -> Result<Annotation, StoreError> {
        validate_video_id(video_id)?;
        let mut videos = self.videos.write().await;
        let record = videos
            .get_mut(video_id)
            .and_then(|list| list.iter_mut().find(|a| a.id == id))
            .ok_or_else(|| StoreError::NotFound {
                video_id: video_id.to_string(),
                id: id.to_string(),
            })?;

        let patch = patch.validated(record)?;
        record.apply_patch(&patch);
        Ok(record.clone())
    }

    async fn delete(&self, video_id: &str, id: &str) -> Result<(), StoreError> {
        validate_video_id(video_id)?;
        if let Some(list) = self.videos.write().await.get_mut(video_id) {
            list.retain(|a| a.id != id);
        }
        Ok(())
    }
}
