//! Review session state.
//!
//! [`ReviewSession`] owns everything a review UI renders: the video list,
//! the selected video, its annotations, the playback clock and the active
//! frame range. Every mutation publishes a [`SessionEvent`] on the bus.
//! Store failures are recorded in [`ReviewSession::error`] and published as
//! [`EventKind::Error`]; nothing is retried.

use std::sync::Arc;

use framemark_core::annotation::Annotation;
use framemark_core::binder::{AnnotationRangeBinder, BinderContext};
use framemark_core::collection::AnnotationSet;
use framemark_core::error::StoreError;
use framemark_core::looping::{LoopController, LoopOutcome};
use framemark_core::playback::PlaybackClock;
use framemark_core::range::FrameRange;
use framemark_core::store::AnnotationStore;
use framemark_core::timing::{format_timecode, DEFAULT_FPS};
use framemark_core::types::{FrameIndex, VideoId};
use framemark_core::video::{Video, VideoCatalog};
use framemark_events::{EventBus, EventKind, SessionEvent};
use serde::Serialize;
use tokio::sync::watch;

/// Why a session operation did not happen.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No video selected")]
    NoVideoSelected,

    #[error("Unknown video: {0}")]
    UnknownVideo(VideoId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Serializable view of the session, for UIs and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub videos: Vec<Video>,
    pub selected_video_id: Option<VideoId>,
    pub annotations: Vec<Annotation>,
    pub loading: bool,
    pub error: Option<String>,
    pub range: FrameRange,
    pub current_time: f64,
    pub current_frame: FrameIndex,
    pub total_frames: FrameIndex,
    pub duration: f64,
    pub fps: f64,
    pub playing: bool,
    pub loop_enabled: bool,
    /// Id of the record bound to `range`, if any.
    pub current_annotation_id: Option<String>,
    pub tags: Vec<String>,
    pub notes: String,
    pub rating: u8,
    /// Ids of records whose range contains the current frame.
    pub highlighted: Vec<String>,
}

pub struct ReviewSession {
    catalog: Arc<dyn VideoCatalog>,
    store: Arc<dyn AnnotationStore>,
    bus: Arc<EventBus>,

    videos: Vec<Video>,
    selected: Option<VideoId>,
    annotations: AnnotationSet,
    loading: bool,
    error: Option<String>,

    /// Present only while a video is selected.
    clock: Option<PlaybackClock>,
    binder: AnnotationRangeBinder,
    looper: LoopController,
}

impl ReviewSession {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        store: Arc<dyn AnnotationStore>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            catalog,
            store,
            bus,
            videos: Vec::new(),
            selected: None,
            annotations: AnnotationSet::new(),
            loading: false,
            error: None,
            clock: None,
            binder: AnnotationRangeBinder::default(),
            looper: LoopController::new(),
        }
    }

    // -- Read side ----------------------------------------------------------

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn selected_video(&self) -> Option<&Video> {
        let id = self.selected.as_deref()?;
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn clock(&self) -> Option<&PlaybackClock> {
        self.clock.as_ref()
    }

    /// Authoritative seeks for the playback element of the selected video.
    pub fn subscribe_seeks(&self) -> Option<watch::Receiver<f64>> {
        self.clock.as_ref().map(PlaybackClock::subscribe_seeks)
    }

    pub fn range(&self) -> FrameRange {
        self.binder.range()
    }

    pub fn current_annotation(&self) -> Option<&Annotation> {
        self.binder.current(&self.annotations)
    }

    pub fn tags(&self) -> &[String] {
        self.binder.tags(&self.annotations)
    }

    pub fn notes(&self) -> &str {
        self.binder.notes(&self.annotations)
    }

    pub fn rating(&self) -> u8 {
        self.binder.rating(&self.annotations)
    }

    pub fn loop_enabled(&self) -> bool {
        self.looper.is_enabled()
    }

    /// Records whose inclusive range contains the current frame.
    pub fn annotations_at_frame(&self) -> Vec<&Annotation> {
        match &self.clock {
            Some(clock) => self.annotations.at_frame(clock.current_frame()),
            None => Vec::new(),
        }
    }

    /// `"Frame: 30 / 300 | 1.00s / 10.00s"`, or `None` without a video.
    pub fn status_line(&self) -> Option<String> {
        let clock = self.clock.as_ref()?;
        Some(format!(
            "Frame: {} / {} | {} / {}",
            clock.current_frame(),
            clock.total_frames(),
            format_timecode(clock.current_time()),
            format_timecode(clock.duration()),
        ))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let clock = self.clock.as_ref();
        SessionSnapshot {
            videos: self.videos.clone(),
            selected_video_id: self.selected.clone(),
            annotations: self.annotations.to_vec(),
            loading: self.loading,
            error: self.error.clone(),
            range: self.range(),
            current_time: clock.map_or(0.0, |c| c.current_time()),
            current_frame: clock.map_or(0, |c| c.current_frame()),
            total_frames: clock.map_or(0, |c| c.total_frames()),
            duration: clock.map_or(0.0, |c| c.duration()),
            fps: clock.map_or(DEFAULT_FPS, |c| c.fps()),
            playing: clock.is_some_and(|c| c.is_playing()),
            loop_enabled: self.looper.is_enabled(),
            current_annotation_id: self.current_annotation().map(|a| a.id.clone()),
            tags: self.tags().to_vec(),
            notes: self.notes().to_string(),
            rating: self.rating(),
            highlighted: self
                .annotations_at_frame()
                .into_iter()
                .map(|a| a.id.clone())
                .collect(),
        }
    }

    // -- Videos -------------------------------------------------------------

    /// Fetch the video list. Selects the first video when none is selected.
    pub async fn load_videos(&mut self) -> Result<(), SessionError> {
        self.loading = true;
        self.error = None;
        let result = self.catalog.list_videos().await;
        self.loading = false;

        let videos = self.record(result.map_err(SessionError::from))?;
        self.videos = videos;
        self.emit(EventKind::VideosLoaded {
            count: self.videos.len(),
        });

        if self.selected.is_none() {
            if let Some(first) = self.videos.first().map(|v| v.id.clone()) {
                self.select_video(&first).await?;
            }
        }
        Ok(())
    }

    /// Select a video from the list: reset the clock to its metadata and
    /// load its annotations.
    pub async fn select_video(&mut self, video_id: &str) -> Result<(), SessionError> {
        let Some(video) = self.videos.iter().find(|v| v.id == video_id) else {
            return self.record(Err(SessionError::UnknownVideo(video_id.to_string())));
        };
        let source = video.metadata.source_info();

        self.clock
            .get_or_insert_with(PlaybackClock::new)
            .load_source(source);
        self.selected = Some(video_id.to_string());
        self.annotations.clear();

        tracing::debug!(video_id, "Video selected");
        self.emit(EventKind::VideoSelected);
        self.load_annotations().await
    }

    /// Drop the selection and its playback state.
    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.clock = None;
            self.annotations.clear();
            self.emit(EventKind::VideoDeselected);
        }
    }

    /// Replace the local annotations with the store's listing.
    pub async fn load_annotations(&mut self) -> Result<(), SessionError> {
        let Some(video_id) = self.selected.clone() else {
            return Ok(());
        };
        let result = self.store.list(&video_id).await;
        let records = self.record(result.map_err(SessionError::from))?;

        if self.selected.as_deref() != Some(video_id.as_str()) {
            tracing::debug!(video_id = %video_id, "Dropping annotations for deselected video");
            return Ok(());
        }
        self.annotations.replace_all(records);
        self.emit_annotations_changed();
        Ok(())
    }

    // -- Range --------------------------------------------------------------

    /// Change the active frame range. The bound record follows the range.
    pub fn set_range(&mut self, range: FrameRange) {
        if !self.binder.set_range(range) {
            return;
        }
        self.emit(EventKind::RangeChanged { range });
        if !range.is_valid() {
            self.emit(EventKind::LoopMisconfigured { range });
        }
    }

    // -- Playback -----------------------------------------------------------

    /// Time reported by the playback element. Applies looping.
    pub fn on_playback_time(&mut self, time: f64) -> LoopOutcome {
        let range = self.binder.range();
        let Some(clock) = self.clock.as_mut() else {
            return LoopOutcome::Idle;
        };
        clock.observe(time);
        let outcome = self.looper.on_time_update(clock, Some(range));

        if let LoopOutcome::Wrapped { to_time } = outcome {
            self.emit(EventKind::LoopWrapped { to_time });
        }
        self.emit_time();
        outcome
    }

    pub fn seek_to(&mut self, time: f64) -> Option<f64> {
        let t = self.clock.as_mut()?.seek_to(time);
        self.emit_time();
        Some(t)
    }

    pub fn seek_to_frame(&mut self, frame: FrameIndex) -> Option<f64> {
        let t = self.clock.as_mut()?.seek_to_frame(frame);
        self.emit_time();
        Some(t)
    }

    pub fn step_frame(&mut self, delta: FrameIndex) -> Option<f64> {
        let t = self.clock.as_mut()?.step_frame(delta);
        self.emit_time();
        Some(t)
    }

    pub fn toggle_play(&mut self) -> Option<bool> {
        let clock = self.clock.as_mut()?;
        clock.toggle_play();
        let playing = clock.is_playing();
        self.emit(EventKind::PlayStateChanged { playing });
        Some(playing)
    }

    pub fn set_playing(&mut self, playing: bool) -> Option<bool> {
        self.clock.as_mut()?.set_playing(playing);
        self.emit(EventKind::PlayStateChanged { playing });
        Some(playing)
    }

    pub fn set_fps(&mut self, fps: f64) -> Option<f64> {
        let clock = self.clock.as_mut()?;
        clock.set_fps(fps);
        let fps = clock.fps();
        self.emit(EventKind::FpsChanged { fps });
        Some(fps)
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.looper.set_enabled(enabled);
    }

    // -- Annotation editing -------------------------------------------------

    pub async fn set_rating(&mut self, rating: u8) -> Result<(), SessionError> {
        let result = match self.edit_parts() {
            Ok((binder, mut cx)) => binder.set_rating(&mut cx, rating).await.map_err(Into::into),
            Err(e) => Err(e),
        };
        self.finish_edit(result)
    }

    /// Returns `false` when the tag was blank or already present.
    pub async fn add_tag(&mut self, tag: &str) -> Result<bool, SessionError> {
        let result = match self.edit_parts() {
            Ok((binder, mut cx)) => binder.add_tag(&mut cx, tag).await.map_err(Into::into),
            Err(e) => Err(e),
        };
        self.finish_edit(result)
    }

    pub async fn remove_tag(&mut self, tag: &str) -> Result<(), SessionError> {
        let result = match self.edit_parts() {
            Ok((binder, mut cx)) => binder.remove_tag(&mut cx, tag).await.map_err(Into::into),
            Err(e) => Err(e),
        };
        self.finish_edit(result)
    }

    pub async fn set_notes(&mut self, notes: &str) -> Result<(), SessionError> {
        let result = match self.edit_parts() {
            Ok((binder, mut cx)) => binder.set_notes(&mut cx, notes).await.map_err(Into::into),
            Err(e) => Err(e),
        };
        self.finish_edit(result)
    }

    /// Delete the record bound to the active range, if any.
    pub async fn clear_current(&mut self) -> Result<Option<Annotation>, SessionError> {
        let result = match self.edit_parts() {
            Ok((binder, mut cx)) => binder.clear(&mut cx).await.map_err(Into::into),
            Err(e) => Err(e),
        };
        self.finish_edit(result)
    }

    /// Delete any record of the selected video by id.
    pub async fn delete_annotation(&mut self, id: &str) -> Result<(), SessionError> {
        let Some(video_id) = self.selected.clone() else {
            return self.record(Err(SessionError::NoVideoSelected));
        };
        let result = self.store.delete(&video_id, id).await;
        self.record(result.map_err(SessionError::from))?;

        self.annotations.remove(id);
        tracing::debug!(video_id = %video_id, annotation_id = id, "Annotation deleted");
        self.emit_annotations_changed();
        Ok(())
    }

    // -- Helpers ------------------------------------------------------------

    /// Split borrows for a binder call on the selected video.
    fn edit_parts(&mut self) -> Result<(&AnnotationRangeBinder, BinderContext<'_>), SessionError> {
        let video_id = self
            .selected
            .as_deref()
            .ok_or(SessionError::NoVideoSelected)?;
        let timestamp = self.clock.as_ref().map_or(0.0, |c| c.current_time());
        Ok((
            &self.binder,
            BinderContext {
                store: self.store.as_ref(),
                video_id,
                annotations: &mut self.annotations,
                timestamp,
            },
        ))
    }

    fn finish_edit<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        let value = self.record(result)?;
        self.emit_annotations_changed();
        Ok(value)
    }

    /// Record a failure in `error` and publish it.
    fn record<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, video_id = ?self.selected, "Session operation failed");
            let message = e.to_string();
            self.error = Some(message.clone());
            self.emit(EventKind::Error { message });
        }
        result
    }

    fn emit(&self, kind: EventKind) {
        let event = SessionEvent::new(kind);
        let event = match &self.selected {
            Some(id) => event.with_video(id.clone()),
            None => event,
        };
        self.bus.publish(event);
    }

    fn emit_time(&self) {
        if let Some(clock) = &self.clock {
            self.emit(EventKind::TimeChanged {
                time: clock.current_time(),
                frame: clock.current_frame(),
            });
        }
    }

    fn emit_annotations_changed(&self) {
        self.emit(EventKind::AnnotationsChanged {
            count: self.annotations.len(),
        });
    }
}
