//! Inclusive frame range an annotation applies to.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timing::time_of;
use crate::types::FrameIndex;

/// Range selected when a session starts.
pub const DEFAULT_FRAME_RANGE: FrameRange = FrameRange {
    start_frame: 0,
    end_frame: 10,
};

/// Inclusive `[start_frame, end_frame]` window.
///
/// The fields are public so that ranges read back from storage or typed in
/// by a user can be represented even when malformed; use
/// [`FrameRange::new`] to build a range that is known to be valid and
/// [`FrameRange::validate`] to check one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRange {
    pub start_frame: FrameIndex,
    pub end_frame: FrameIndex,
}

impl Default for FrameRange {
    fn default() -> Self {
        DEFAULT_FRAME_RANGE
    }
}

impl FrameRange {
    /// Build a validated range.
    pub fn new(start_frame: FrameIndex, end_frame: FrameIndex) -> Result<Self, CoreError> {
        let range = Self {
            start_frame,
            end_frame,
        };
        range.validate()?;
        Ok(range)
    }

    /// Check `0 <= start_frame <= end_frame`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.start_frame < 0 {
            return Err(CoreError::Validation(format!(
                "startFrame must be >= 0, got {}",
                self.start_frame
            )));
        }
        if self.end_frame < self.start_frame {
            return Err(CoreError::Validation(format!(
                "endFrame ({}) must be >= startFrame ({})",
                self.end_frame, self.start_frame
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// `start_frame == end_frame`.
    pub fn is_zero_width(&self) -> bool {
        self.start_frame == self.end_frame
    }

    /// Whether `frame` falls inside the inclusive range.
    pub fn contains(&self, frame: FrameIndex) -> bool {
        frame >= self.start_frame && frame <= self.end_frame
    }

    /// Start time of the first frame.
    pub fn start_time(&self, fps: f64) -> f64 {
        time_of(self.start_frame, fps)
    }

    /// Start time of the last frame.
    pub fn end_time(&self, fps: f64) -> f64 {
        time_of(self.end_frame, fps)
    }
}

impl std::fmt::Display for FrameRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_frame, self.end_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_valid_range() {
        let r = FrameRange::new(30, 60).unwrap();
        assert_eq!(r.start_frame, 30);
        assert_eq!(r.end_frame, 60);
    }

    #[test]
    fn new_accepts_zero_width() {
        let r = FrameRange::new(30, 30).unwrap();
        assert!(r.is_zero_width());
    }

    #[test]
    fn new_rejects_negative_start() {
        let err = FrameRange::new(-1, 5).unwrap_err();
        assert!(err.to_string().contains("startFrame must be >= 0"));
    }

    #[test]
    fn new_rejects_inverted_range() {
        let err = FrameRange::new(10, 5).unwrap_err();
        assert!(err.to_string().contains("endFrame (5) must be >= startFrame (10)"));
    }

    #[test]
    fn contains_is_inclusive() {
        let r = FrameRange::new(10, 20).unwrap();
        assert!(r.contains(10));
        assert!(r.contains(20));
        assert!(!r.contains(9));
        assert!(!r.contains(21));
    }

    #[test]
    fn bound_times() {
        let r = FrameRange::new(30, 60).unwrap();
        assert!((r.start_time(30.0) - 1.0).abs() < f64::EPSILON);
        assert!((r.end_time(30.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn default_is_zero_to_ten() {
        assert_eq!(FrameRange::default(), FrameRange::new(0, 10).unwrap());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(FrameRange::new(1, 2).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"startFrame": 1, "endFrame": 2}));
    }

    #[test]
    fn display_uses_dash() {
        assert_eq!(FrameRange::new(3, 9).unwrap().to_string(), "3-9");
    }
}
