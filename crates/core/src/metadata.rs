//! Video metadata and the provider contract used to obtain it.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::playback::SourceInfo;
use crate::timing::DEFAULT_FPS;

/// Width assumed when a probe does not report one.
pub const DEFAULT_WIDTH: u32 = 1920;

/// Height assumed when a probe does not report one.
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Basic properties of a video file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for VideoMetadata {
    /// Zero duration, 30 fps, 1920x1080.
    fn default() -> Self {
        Self {
            duration: 0.0,
            fps: DEFAULT_FPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl VideoMetadata {
    /// What the playback clock adopts when this video is selected.
    pub fn source_info(&self) -> SourceInfo {
        SourceInfo {
            duration: Some(self.duration),
            fps: Some(self.fps),
        }
    }
}

/// Source of video metadata.
///
/// Probing never fails the caller: implementations log problems and fall
/// back to [`VideoMetadata::default`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn probe(&self, path: &Path) -> VideoMetadata;
}

/// Provider returning the same metadata for every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMetadataProvider(pub VideoMetadata);

#[async_trait]
impl MetadataProvider for StaticMetadataProvider {
    async fn probe(&self, _path: &Path) -> VideoMetadata {
        self.0
    }
}
