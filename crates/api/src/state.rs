use std::sync::Arc;

use framemark_core::ffmpeg::FfprobeMetadataProvider;
use framemark_core::metadata::MetadataProvider;
use framemark_core::store::AnnotationStore;
use framemark_store::{JsonFileAnnotationStore, MemoryAnnotationStore, VideoLibrary};

use crate::config::{AnnotationBackend, ServerConfig};

/// Handler state: configuration, the annotation backend and the video library.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Annotation persistence backend selected by `ANNOTATION_BACKEND`.
    pub store: Arc<dyn AnnotationStore>,
    /// Video listing over `config.videos_dir`.
    pub library: Arc<VideoLibrary>,
}

impl AppState {
    /// Build the state for `config`, probing metadata with `ffprobe`.
    pub fn from_config(config: ServerConfig) -> Self {
        let metadata = Arc::new(FfprobeMetadataProvider::new(config.ffprobe_bin.clone()));
        Self::with_metadata(config, metadata)
    }

    /// Build the state with a custom metadata provider.
    pub fn with_metadata(config: ServerConfig, metadata: Arc<dyn MetadataProvider>) -> Self {
        let store: Arc<dyn AnnotationStore> = match config.annotation_backend {
            AnnotationBackend::File => {
                Arc::new(JsonFileAnnotationStore::new(config.annotations_dir.clone()))
            }
            AnnotationBackend::Memory => Arc::new(MemoryAnnotationStore::new()),
        };
        let library = VideoLibrary::new(config.videos_dir.clone(), store.clone(), metadata);

        Self {
            config: Arc::new(config),
            store,
            library: Arc::new(library),
        }
    }
}
