//! Video listing entries and the catalog contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::error::StoreError;
use crate::metadata::VideoMetadata;
use crate::types::VideoId;

/// Per-video annotation statistics shown in the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStats {
    pub annotation_count: usize,
    /// Sum of tag list lengths over all annotations.
    pub tag_count: usize,
    /// Mean rating rounded to one decimal, 0 when there are no annotations.
    pub avg_rating: f64,
}

impl VideoStats {
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        if annotations.is_empty() {
            return Self::default();
        }
        let total: u32 = annotations.iter().map(|a| u32::from(a.rating)).sum();
        let mean = f64::from(total) / annotations.len() as f64;
        Self {
            annotation_count: annotations.len(),
            tag_count: annotations.iter().map(|a| a.tags.len()).sum(),
            avg_rating: (mean * 10.0).round() / 10.0,
        }
    }
}

/// One entry of the video listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// File stem; also the annotation store key.
    pub id: VideoId,
    /// File name including extension.
    pub name: String,
    /// URL the file is served from.
    pub url: String,
    /// 1-based position in the listing.
    pub index: usize,
    #[serde(flatten)]
    pub metadata: VideoMetadata,
    #[serde(flatten)]
    pub stats: VideoStats,
}

/// Source of the video listing.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn list_videos(&self) -> Result<Vec<Video>, StoreError>;
}
