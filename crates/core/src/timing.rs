//! Conversion between continuous playback time and discrete frame indices.
//!
//! Frames are counted from zero: frame `n` covers the half-open interval
//! `[n / fps, (n + 1) / fps)`.

use crate::types::FrameIndex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest frame rate the playback clock accepts.
pub const MIN_FPS: f64 = 1.0;

/// Highest frame rate the playback clock accepts.
pub const MAX_FPS: f64 = 120.0;

/// Frame rate assumed when a source does not report one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Relative slack added to `time * fps` before flooring.
///
/// `f / fps * fps` can land a few ULPs below `f`; the slack keeps the
/// frame -> time -> frame round trip exact without moving real boundaries.
const RELATIVE_SLACK: f64 = 1e-12;

/// Absolute slack for products close to zero.
const ABSOLUTE_SLACK: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Frame index containing `time` at the given frame rate (`floor(time * fps)`).
///
/// Monotonic non-decreasing in `time` for a fixed `fps`. Callers are
/// responsible for passing a positive `fps`.
pub fn frame_of(time: f64, fps: f64) -> FrameIndex {
    let product = time * fps;
    (product + product.abs() * RELATIVE_SLACK + ABSOLUTE_SLACK).floor() as FrameIndex
}

/// Start time in seconds of `frame` at the given frame rate.
pub fn time_of(frame: FrameIndex, fps: f64) -> f64 {
    frame as f64 / fps
}

/// Clamp a frame rate into `[MIN_FPS, MAX_FPS]`, falling back to
/// [`DEFAULT_FPS`] for NaN or infinite input.
pub fn clamp_fps(fps: f64) -> f64 {
    if !fps.is_finite() {
        return DEFAULT_FPS;
    }
    fps.clamp(MIN_FPS, MAX_FPS)
}

/// Format a time value the way the player status line shows it (`"12.34s"`).
pub fn format_timecode(time: f64) -> String {
    format!("{time:.2}s")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
