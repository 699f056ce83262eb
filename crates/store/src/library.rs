//! Local video library: a directory of `.mp4` files plus their annotation
//! statistics and probed metadata.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use framemark_core::error::StoreError;
use framemark_core::metadata::MetadataProvider;
use framemark_core::store::AnnotationStore;
use framemark_core::video::{Video, VideoCatalog, VideoStats};

/// Extension of the files listed by the library.
pub const VIDEO_EXTENSION: &str = "mp4";

/// URL prefix under which video files are served.
pub const VIDEOS_URL_PREFIX: &str = "/videos";

/// Scans a videos directory and builds the listing.
#[derive(Clone)]
pub struct VideoLibrary {
    videos_dir: PathBuf,
    store: Arc<dyn AnnotationStore>,
    metadata: Arc<dyn MetadataProvider>,
}

impl VideoLibrary {
    pub fn new(
        videos_dir: impl Into<PathBuf>,
        store: Arc<dyn AnnotationStore>,
        metadata: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            videos_dir: videos_dir.into(),
            store,
            metadata,
        }
    }

    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    /// Whether the videos directory exists and can be listed.
    pub async fn is_readable(&self) -> bool {
        tokio::fs::read_dir(&self.videos_dir).await.is_ok()
    }

    /// File names of the listed videos, sorted.
    async fn scan(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.videos_dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VIDEO_EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn describe(&self, index: usize, name: String) -> Result<Video, StoreError> {
        let path = self.videos_dir.join(&name);
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name.as_str())
            .to_string();

        let (annotations, metadata) =
            tokio::join!(self.store.list(&id), self.metadata.probe(&path));

        Ok(Video {
            url: format!("{VIDEOS_URL_PREFIX}/{name}"),
            stats: VideoStats::from_annotations(&annotations?),
            id,
            name,
            index,
            metadata,
        })
    }

    /// Every video in the directory, in file-name order, described
    /// concurrently.
    pub async fn list_videos(&self) -> Result<Vec<Video>, StoreError> {
        let names = self.scan().await?;
        let videos = futures::future::try_join_all(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| self.describe(i + 1, name)),
        )
        .await?;

        tracing::debug!(count = videos.len(), dir = %self.videos_dir.display(), "Listed videos");
        Ok(videos)
    }
}

#[async_trait]
impl VideoCatalog for VideoLibrary {
    async fn list_videos(&self) -> Result<Vec<Video>, StoreError> {
        VideoLibrary::list_videos(self).await
    }
}
