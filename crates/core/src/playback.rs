//! Playback clock: continuous time, duration, play flag and frame rate.
//!
//! The clock is the single source of truth for "where is the playhead".
//! A playback element (e.g. a video widget) reports its time through
//! [`PlaybackClock::observe`] and receives authoritative seeks through the
//! watch channel returned by [`PlaybackClock::subscribe_seeks`].

use tokio::sync::watch;

use crate::timing::{clamp_fps, frame_of, time_of, DEFAULT_FPS};
use crate::types::FrameIndex;

/// Drift (in seconds) between the playback element and the clock above
/// which the element should be re-seeked.
pub const SYNC_TOLERANCE_SECS: f64 = 0.1;

/// Duration and frame rate reported by a newly loaded video source.
///
/// `None` or non-positive values mean "unknown" and keep the clock's prior
/// value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceInfo {
    pub duration: Option<f64>,
    pub fps: Option<f64>,
}

/// Playback state for the selected video.
#[derive(Debug)]
pub struct PlaybackClock {
    current_time: f64,
    duration: f64,
    playing: bool,
    fps: f64,
    seek_tx: watch::Sender<f64>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    /// A paused clock at time zero with no duration and the default rate.
    pub fn new() -> Self {
        let (seek_tx, _) = watch::channel(0.0);
        Self {
            current_time: 0.0,
            duration: 0.0,
            playing: false,
            fps: DEFAULT_FPS,
            seek_tx,
        }
    }

    /// A clock already adopted to `source`.
    pub fn for_source(source: SourceInfo) -> Self {
        let mut clock = Self::new();
        clock.load_source(source);
        clock
    }

    // -- Accessors ----------------------------------------------------------

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Frame containing the current time.
    pub fn current_frame(&self) -> FrameIndex {
        frame_of(self.current_time, self.fps)
    }

    /// Frame containing the end of the video (`frame_of(duration, fps)`).
    pub fn total_frames(&self) -> FrameIndex {
        frame_of(self.duration, self.fps)
    }

    // -- Configuration ------------------------------------------------------

    /// Set the frame rate, clamped to `[1, 120]`. The current time is not
    /// rescaled, so the current frame may change.
    pub fn set_fps(&mut self, fps: f64) {
        self.fps = clamp_fps(fps);
    }

    /// Set the duration. The current time is not clamped retroactively.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
    }

    /// Reset for a newly selected video source.
    ///
    /// Time goes back to zero and playback pauses. Reported duration and fps
    /// are adopted only when positive.
    pub fn load_source(&mut self, source: SourceInfo) {
        self.current_time = 0.0;
        self.playing = false;
        if let Some(duration) = source.duration.filter(|d| d.is_finite() && *d > 0.0) {
            self.duration = duration;
        }
        if let Some(fps) = source.fps.filter(|f| f.is_finite() && *f > 0.0) {
            self.fps = clamp_fps(fps);
        }
        tracing::debug!(
            duration = self.duration,
            fps = self.fps,
            "Playback clock loaded new source"
        );
    }

    // -- Transport ----------------------------------------------------------

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Seek to `time`, clamped to `[0, duration]`, and publish the new time
    /// to the seek channel.
    ///
    /// Returns the clamped time.
    pub fn seek_to(&mut self, time: f64) -> f64 {
        self.current_time = self.clamp_time(time);
        self.seek_tx.send_replace(self.current_time);
        self.current_time
    }

    /// Seek to the start of `frame`.
    pub fn seek_to_frame(&mut self, frame: FrameIndex) -> f64 {
        self.seek_to(time_of(frame, self.fps))
    }

    /// Move `delta` frames from the current frame, staying within
    /// `[0, total_frames]`.
    pub fn step_frame(&mut self, delta: FrameIndex) -> f64 {
        let target = self
            .current_frame()
            .saturating_add(delta)
            .clamp(0, self.total_frames().max(0));
        self.seek_to_frame(target)
    }

    /// Record the time reported by the playback element.
    ///
    /// Unlike [`seek_to`](Self::seek_to) this does not publish to the seek
    /// channel: the element already is at that time.
    pub fn observe(&mut self, time: f64) -> f64 {
        self.current_time = self.clamp_time(time);
        self.current_time
    }

    /// Whether an element reporting `element_time` has drifted far enough
    /// from the clock that it should be re-seeked.
    pub fn needs_resync(&self, element_time: f64) -> bool {
        (element_time - self.current_time).abs() > SYNC_TOLERANCE_SECS
    }

    /// Receiver for authoritative seeks. Rapid seeks coalesce: a receiver
    /// only ever observes the latest value.
    pub fn subscribe_seeks(&self) -> watch::Receiver<f64> {
        self.seek_tx.subscribe()
    }

    fn clamp_time(&self, time: f64) -> f64 {
        if time.is_nan() {
            return 0.0;
        }
        time.clamp(0.0, self.duration)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
