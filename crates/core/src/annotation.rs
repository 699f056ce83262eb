//! Annotation records, creation/update payloads and their validation.
//!
//! An annotation attaches tags, free-text notes and a 1-5 rating to an
//! inclusive frame range of one video. Records are owned by an
//! [`AnnotationStore`](crate::store::AnnotationStore); clients only hold
//! copies.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::range::FrameRange;
use crate::types::{AnnotationId, FrameIndex, VideoId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest allowed rating.
pub const MIN_RATING: u8 = 1;

/// Highest allowed rating.
pub const MAX_RATING: u8 = 5;

/// Rating given to records created implicitly by the first edit.
pub const DEFAULT_RATING: u8 = 3;

fn default_rating() -> u8 {
    DEFAULT_RATING
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A persisted annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    pub video_id: VideoId,
    /// Playback time (seconds) when the annotation was created.
    #[serde(default)]
    pub timestamp: f64,
    pub start_frame: FrameIndex,
    pub end_frame: FrameIndex,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_rating")]
    pub rating: u8,
}

impl Annotation {
    /// Build a record from a creation payload and server-assigned identity.
    pub fn from_new(id: AnnotationId, video_id: VideoId, input: NewAnnotation) -> Self {
        Self {
            id,
            video_id,
            timestamp: input.timestamp,
            start_frame: input.start_frame,
            end_frame: input.end_frame,
            tags: input.tags,
            notes: input.notes,
            rating: input.rating,
        }
    }

    pub fn range(&self) -> FrameRange {
        FrameRange {
            start_frame: self.start_frame,
            end_frame: self.end_frame,
        }
    }

    /// Merge the present fields of `patch` into this record.
    pub fn apply_patch(&mut self, patch: &AnnotationPatch) {
        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(start) = patch.start_frame {
            self.start_frame = start;
        }
        if let Some(end) = patch.end_frame {
            self.end_frame = end;
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}

/// Payload for creating an annotation. The store assigns `id` and takes
/// `video_id` from the request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnotation {
    #[serde(default)]
    pub timestamp: f64,
    pub start_frame: FrameIndex,
    pub end_frame: FrameIndex,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_rating")]
    pub rating: u8,
}

impl NewAnnotation {
    /// An empty record for `range`: no tags, no notes, default rating.
    pub fn empty(range: FrameRange, timestamp: f64) -> Self {
        Self {
            timestamp,
            start_frame: range.start_frame,
            end_frame: range.end_frame,
            tags: Vec::new(),
            notes: String::new(),
            rating: DEFAULT_RATING,
        }
    }

    /// Validate the payload and normalize its tags.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.range().validate()?;
        validate_rating(self.rating)?;
        self.tags = normalize_tags(&self.tags);
        Ok(self)
    }

    pub fn range(&self) -> FrameRange {
        FrameRange {
            start_frame: self.start_frame,
            end_frame: self.end_frame,
        }
    }
}

/// Partial update. Absent fields are left unchanged; identity fields cannot
/// be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<FrameIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frame: Option<FrameIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl AnnotationPatch {
    pub fn rating(rating: u8) -> Self {
        Self {
            rating: Some(rating),
            ..Self::default()
        }
    }

    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Self::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate the present fields and normalize tags.
    ///
    /// The frame bounds are checked against `current` so that patching only
    /// one side of the range cannot invert it.
    pub fn validated(mut self, current: &Annotation) -> Result<Self, CoreError> {
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        if self.start_frame.is_some() || self.end_frame.is_some() {
            FrameRange {
                start_frame: self.start_frame.unwrap_or(current.start_frame),
                end_frame: self.end_frame.unwrap_or(current.end_frame),
            }
            .validate()?;
        }
        if let Some(tags) = &self.tags {
            self.tags = Some(normalize_tags(tags));
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate that a rating is within `[MIN_RATING, MAX_RATING]`.
pub fn validate_rating(rating: u8) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

/// Validate a video identifier used as a storage key.
///
/// Identifiers are file stems, so anything a file name may contain is
/// accepted (`take..2`, `take#2`). The id must be non-empty and name a
/// single file: no path separators, no `.` or `..`.
pub fn validate_video_id(video_id: &str) -> Result<(), CoreError> {
    if video_id.trim().is_empty() {
        return Err(CoreError::Validation("video id must not be empty".to_string()));
    }
    let mut components = Path::new(video_id).components();
    let single_file = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_file || video_id.contains(['/', '\\']) {
        return Err(CoreError::Validation(format!(
            "Invalid video id '{video_id}'. Must be a single file name"
        )));
    }
    Ok(())
}

/// Trim a tag. Returns `None` when nothing is left.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trim every tag, drop empty ones and remove exact duplicates, keeping the
/// first occurrence.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().filter_map(|t| normalize_tag(t)) {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
