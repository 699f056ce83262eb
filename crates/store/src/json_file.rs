//! Annotation store persisting one JSON file per video.
//!
//! Layout: `{dir}/{video_id}.txt`, a pretty-printed JSON array of
//! annotations in insertion order, next to the video by default. Every
//! write rewrites the whole file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use framemark_core::annotation::{validate_video_id, Annotation, AnnotationPatch, NewAnnotation};
use framemark_core::error::StoreError;
use framemark_core::store::AnnotationStore;
use tokio::sync::Mutex;

/// Extension of the per-video annotation file.
pub const ANNOTATION_FILE_EXTENSION: &str = "txt";

/// File-backed [`AnnotationStore`].
///
/// Operations are serialized by a store-wide async mutex, so concurrent
/// read-modify-write cycles never interleave.
#[derive(Debug)]
pub struct JsonFileAnnotationStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileAnnotationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{video_id}.{ANNOTATION_FILE_EXTENSION}"))
    }

    /// Read a video's records. Missing, blank or unparsable files read as
    /// an empty list.
    async fn read_all(&self, video_id: &str) -> Result<Vec<Annotation>, StoreError> {
        let path = self.path_for(video_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Unreadable annotation file, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn write_all(&self, video_id: &str, records: &[Annotation]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(self.path_for(video_id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl AnnotationStore for JsonFileAnnotationStore {
    async fn list(&self, video_id: &str) -> Result<Vec<Annotation>, StoreError> {
        validate_video_id(video_id)?;
        let _guard = self.lock.lock().await;
        self.read_all(video_id).await
    }

    async fn create(&self, video_id: &str, input: NewAnnotation) -> Result<Annotation, StoreError> {
        validate_video_id(video_id)?;
        let input = input.validated()?;
        let annotation = Annotation::from_new(
            uuid::Uuid::new_v4().to_string(),
            video_id.to_string(),
            input,
        );

        let _guard = self.lock.lock().await;
        let mut records = self.read_all(video_id).await?;
        records.push(annotation.clone());
        self.write_all(video_id, &records).await?;

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

        let _guard = self.lock.lock().await;
        let mut records = self.read_all(video_id).await?;
        let record = records
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound {
                video_id: video_id.to_string(),
                id: id.to_string(),
            })?;

        let patch = patch.validated(record)?;
        record.apply_patch(&patch);
        let updated = record.clone();
        self.write_all(video_id, &records).await?;

        tracing::debug!(video_id, annotation_id = id, "Annotation updated");
        Ok(updated)
    }

    async fn delete(&self, video_id: &str, id: &str) -> Result<(), StoreError> {
        validate_video_id(video_id)?;

        let _guard = self.lock.lock().await;
        let mut records = self.read_all(video_id).await?;
        records.retain(|a| a.id != id);
        self.write_all(video_id, &records).await?;

        tracing::debug!(video_id, annotation_id = id, "Annotation deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use framemark_core::range::FrameRange;

    fn input(start: i64, end: i64) -> NewAnnotation {
        NewAnnotation::empty(
            FrameRange {
                start_frame: start,
                end_frame: end,
            },
            0.5,
        )
    }

    #[tokio::test]
    async fn records_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let store = JsonFileAnnotationStore::new(dir.path());
            let a = store.create("clip", input(30, 60)).await.unwrap();
            store
                .update("clip", &a.id, AnnotationPatch::tags(vec!["pose".into()]))
                .await
                .unwrap()
        };

        let reopened = JsonFileAnnotationStore::new(dir.path());
        let listed = reopened.list("clip").await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn file_is_pretty_printed_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAnnotationStore::new(dir.path());
        store.create("clip", input(1, 2)).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("clip.txt")).unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.contains("\"startFrame\": 1"));
        assert!(raw.contains("\"videoId\": \"clip\""));
    }

    #[tokio::test]
    async fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAnnotationStore::new(dir.path());
        assert!(store.list("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.txt"), "  \n").unwrap();
        let store = JsonFileAnnotationStore::new(dir.path());
        assert!(store.list("clip").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_lists_empty_and_is_overwritten_on_create() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.txt"), "{not json").unwrap();
        let store = JsonFileAnnotationStore::new(dir.path());

        assert!(store.list("clip").await.unwrap().is_empty());
        store.create("clip", input(0, 10)).await.unwrap();
        assert_eq!(store.list("clip").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = JsonFileAnnotationStore::new(&nested);
        store.create("clip", input(0, 10)).await.unwrap();
        assert!(nested.join("clip.txt").exists());
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAnnotationStore::new(dir.path());
        let err = store
            .update("clip", "missing", AnnotationPatch::notes("x"))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::NotFound { ref id, .. } if id == "missing");
    }

    #[tokio::test]
    async fn delete_removes_only_matching_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAnnotationStore::new(dir.path());
        let a = store.create("clip", input(0, 10)).await.unwrap();
        let b = store.create("clip", input(20, 30)).await.unwrap();

        store.delete("clip", &a.id).await.unwrap();
        store.delete("clip", "missing").await.unwrap();

        let listed = store.list("clip").await.unwrap();
        assert_eq!(listed, vec![b]);
    }

    #[tokio::test]
    async fn concurrent_creates_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonFileAnnotationStore::new(dir.path()));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create("clip", input(i, i + 1)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.list("clip").await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn rejects_traversal_video_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAnnotationStore::new(dir.path());
        let err = store.create("../escape", input(0, 1)).await.unwrap_err();
        assert_matches!(err, StoreError::Validation(_));
    }

    #[tokio::test]
    async fn reads_existing_library_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("take..2.txt"),
            r#"[
  {
    "id": "m1x9k2",
    "videoId": "take..2",
    "timestamp": 1.25,
    "startFrame": 30,
    "endFrame": 60,
    "tags": ["spin", "pose"],
    "notes": "good turn",
    "rating": 4
  }
]"#,
        )
        .unwrap();
        let store = JsonFileAnnotationStore::new(dir.path());

        let listed = store.list("take..2").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "m1x9k2");
        assert_eq!(listed[0].range(), FrameRange { start_frame: 30, end_frame: 60 });
        assert_eq!(listed[0].tags, vec!["spin".to_string(), "pose".to_string()]);
        assert_eq!(listed[0].rating, 4);

        let updated = store
            .update("take..2", "m1x9k2", AnnotationPatch::notes("better"))
            .await
            .unwrap();
        assert_eq!(updated.notes, "better");
        assert!(!dir.path().join("take..2.json").exists());
    }
}
