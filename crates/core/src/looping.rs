//! Range looping during playback.
//!
//! While playing, reaching the start time of the range's end frame seeks
//! back to the start of the range. A zero-width range never loops; a
//! malformed range (`end < start`) disables looping until the range changes.

use crate::playback::PlaybackClock;
use crate::range::FrameRange;

/// What the controller did for one time update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopOutcome {
    /// Looping is disabled, playback is paused or no range is bound.
    Idle,
    /// Time is before the range end; nothing to do.
    Within,
    /// Time reached the range end and the clock was re-seeked.
    Wrapped { to_time: f64 },
    /// The range has zero width; looping does not apply.
    ZeroWidth,
    /// The range is malformed; looping is disabled for it.
    Misconfigured,
}

/// Keeps playback inside the bound frame range.
#[derive(Debug, Clone)]
pub struct LoopController {
    enabled: bool,
    /// Malformed range already reported, so the warning is logged once.
    reported: Option<FrameRange>,
}

impl Default for LoopController {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopController {
    pub fn new() -> Self {
        Self {
            enabled: true,
            reported: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// React to a clock time update.
    ///
    /// `range` is the bound range, if any. On overrun the clock is seeked to
    /// the range start; playback keeps going.
    pub fn on_time_update(
        &mut self,
        clock: &mut PlaybackClock,
        range: Option<FrameRange>,
    ) -> LoopOutcome {
        let Some(range) = range else {
            return LoopOutcome::Idle;
        };

        if range.end_frame < range.start_frame || range.start_frame < 0 {
            if self.reported != Some(range) {
                tracing::warn!(
                    start_frame = range.start_frame,
                    end_frame = range.end_frame,
                    "Malformed loop range, looping disabled"
                );
                self.reported = Some(range);
            }
            return LoopOutcome::Misconfigured;
        }
        self.reported = None;

        if !self.enabled || !clock.is_playing() {
            return LoopOutcome::Idle;
        }
        if range.is_zero_width() {
            return LoopOutcome::ZeroWidth;
        }

        let fps = clock.fps();
        if clock.current_time() >= range.end_time(fps) {
            let to_time = clock.seek_to(range.start_time(fps));
            tracing::trace!(range = %range, to_time, "Loop wrapped");
            return LoopOutcome::Wrapped { to_time };
        }
        LoopOutcome::Within
    }
}
