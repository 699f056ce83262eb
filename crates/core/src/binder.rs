//! Binds the active frame range to at most one annotation record.
//!
//! The "current annotation" is the first record, in collection order, whose
//! `(start_frame, end_frame)` equals the active range. Nothing prevents two
//! records from sharing a range; the binder simply uses the first one.
//!
//! The binder never caches an id. Every accessor and mutator resolves
//! against the live range, so changing the range implicitly switches (or
//! loses) the bound record.

use crate::annotation::{
    normalize_tag, validate_rating, Annotation, AnnotationPatch, NewAnnotation, DEFAULT_RATING,
};
use crate::collection::AnnotationSet;
use crate::error::StoreError;
use crate::range::FrameRange;
use crate::store::AnnotationStore;
use crate::types::AnnotationId;

/// First record whose range equals `range`.
pub fn resolve_current<'a, I>(range: FrameRange, annotations: I) -> Option<&'a Annotation>
where
    I: IntoIterator<Item = &'a Annotation>,
{
    annotations.into_iter().find(|a| a.range() == range)
}

/// Everything a binder mutation needs besides the range itself.
pub struct BinderContext<'a> {
    pub store: &'a dyn AnnotationStore,
    pub video_id: &'a str,
    pub annotations: &'a mut AnnotationSet,
    /// Playback time stamped onto records created by the first edit.
    pub timestamp: f64,
}

/// Owner of the active frame range.
#[derive(Debug, Clone, Default)]
pub struct AnnotationRangeBinder {
    range: FrameRange,
}

impl AnnotationRangeBinder {
    pub fn new(range: FrameRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Replace the active range. Returns `true` if it changed.
    pub fn set_range(&mut self, range: FrameRange) -> bool {
        let changed = self.range != range;
        self.range = range;
        changed
    }

    // -- Read side ----------------------------------------------------------

    pub fn current<'a>(&self, annotations: &'a AnnotationSet) -> Option<&'a Annotation> {
        resolve_current(self.range, annotations.iter())
    }

    pub fn is_bound(&self, annotations: &AnnotationSet) -> bool {
        self.current(annotations).is_some()
    }

    /// Tags of the current record, empty when unbound.
    pub fn tags<'a>(&self, annotations: &'a AnnotationSet) -> &'a [String] {
        self.current(annotations)
            .map(|a| a.tags.as_slice())
            .unwrap_or(&[])
    }

    /// Notes of the current record, empty when unbound.
    pub fn notes<'a>(&self, annotations: &'a AnnotationSet) -> &'a str {
        self.current(annotations).map_or("", |a| a.notes.as_str())
    }

    /// Rating of the current record, [`DEFAULT_RATING`] when unbound.
    pub fn rating(&self, annotations: &AnnotationSet) -> u8 {
        self.current(annotations).map_or(DEFAULT_RATING, |a| a.rating)
    }

    // -- Write side ---------------------------------------------------------

    /// Make sure a record exists for the active range, creating an empty one
    /// (no tags, no notes, default rating) if needed.
    ///
    /// Returns the id of the current record after creation. If another
    /// record with the same range was added meanwhile, the first one in
    /// collection order wins.
    pub async fn ensure_exists(&self, cx: &mut BinderContext<'_>) -> Result<AnnotationId, StoreError> {
        if let Some(current) = self.current(cx.annotations) {
            return Ok(current.id.clone());
        }

        self.range.validate()?;

        let created = cx
            .store
            .create(cx.video_id, NewAnnotation::empty(self.range, cx.timestamp))
            .await?;
        tracing::debug!(
            video_id = cx.video_id,
            annotation_id = %created.id,
            range = %self.range,
            "Created annotation for range"
        );
        let created_id = created.id.clone();
        cx.annotations.insert_created(created);

        Ok(self
            .current(cx.annotations)
            .map(|a| a.id.clone())
            .unwrap_or(created_id))
    }

    /// Set the rating of the current record.
    pub async fn set_rating(&self, cx: &mut BinderContext<'_>, rating: u8) -> Result<(), StoreError> {
        validate_rating(rating)?;
        self.patch_current(cx, |_| AnnotationPatch::rating(rating)).await
    }

    /// Add a tag to the current record.
    ///
    /// No-op (returns `false`, no store call) when the trimmed tag is empty
    /// or already present.
    pub async fn add_tag(&self, cx: &mut BinderContext<'_>, tag: &str) -> Result<bool, StoreError> {
        let Some(tag) = normalize_tag(tag) else {
            return Ok(false);
        };
        if self.tags(cx.annotations).contains(&tag) {
            return Ok(false);
        }
        self.patch_current(cx, |current| {
            let mut tags = current.tags.clone();
            tags.push(tag);
            AnnotationPatch::tags(tags)
        })
        .await?;
        Ok(true)
    }

    /// Remove every exact occurrence of `tag` from the current record.
    pub async fn remove_tag(&self, cx: &mut BinderContext<'_>, tag: &str) -> Result<(), StoreError> {
        self.patch_current(cx, |current| {
            AnnotationPatch::tags(current.tags.iter().filter(|t| *t != tag).cloned().collect())
        })
        .await
    }

    /// Replace the notes of the current record.
    pub async fn set_notes(&self, cx: &mut BinderContext<'_>, notes: &str) -> Result<(), StoreError> {
        self.patch_current(cx, |_| AnnotationPatch::notes(notes)).await
    }

    /// Delete the current record, if any. Returns the removed record.
    pub async fn clear(&self, cx: &mut BinderContext<'_>) -> Result<Option<Annotation>, StoreError> {
        let Some(id) = self.current(cx.annotations).map(|a| a.id.clone()) else {
            return Ok(None);
        };
        cx.store.delete(cx.video_id, &id).await?;
        tracing::debug!(video_id = cx.video_id, annotation_id = %id, "Cleared annotation for range");
        Ok(cx.annotations.remove(&id))
    }

    /// Ensure a record exists, apply `build`'s patch locally, then send it
    /// to the store and reconcile the response.
    async fn patch_current<F>(&self, cx: &mut BinderContext<'_>, build: F) -> Result<(), StoreError>
    where
        F: FnOnce(&Annotation) -> AnnotationPatch,
    {
        let id = self.ensure_exists(cx).await?;
        let Some(current) = cx.annotations.get(&id) else {
            return Err(StoreError::NotFound {
                video_id: cx.video_id.to_string(),
                id,
            });
        };
        let patch = build(current);
        let Some(revision) = cx.annotations.apply_local(&id, &patch) else {
            return Err(StoreError::NotFound {
                video_id: cx.video_id.to_string(),
                id,
            });
        };

        let updated = cx.store.update(cx.video_id, &id, patch).await?;
        cx.annotations.apply_remote(updated, revision);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
