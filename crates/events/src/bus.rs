//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] carries [`SessionEvent`]s from the session command loop to
//! any number of observers (UI adapters, loggers, tests). It is shared via
//! `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use framemark_core::range::FrameRange;
use framemark_core::types::VideoId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// What changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    VideosLoaded { count: usize },
    VideoSelected,
    VideoDeselected,
    TimeChanged { time: f64, frame: i64 },
    PlayStateChanged { playing: bool },
    FpsChanged { fps: f64 },
    RangeChanged { range: FrameRange },
    AnnotationsChanged { count: usize },
    LoopWrapped { to_time: f64 },
    LoopMisconfigured { range: FrameRange },
    Error { message: String },
}

/// A change in a review session.
///
/// Constructed via [`SessionEvent::new`] and optionally scoped to a video
/// with [`with_video`](SessionEvent::with_video).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(flatten)]
    pub kind: EventKind,

    /// Video the event concerns, if any.
    pub video_id: Option<VideoId>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl SessionEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            video_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_video(mut self, video_id: impl Into<VideoId>) -> Self {
        self.video_id = Some(video_id.into());
        self
    }

    /// Dot-separated event name, e.g. `"annotations.changed"`.
    pub fn event_type(&self) -> &'static str {
        match self.kind {
            EventKind::VideosLoaded { .. } => "videos.loaded",
            EventKind::VideoSelected => "video.selected",
            EventKind::VideoDeselected => "video.deselected",
            EventKind::TimeChanged { .. } => "playback.time_changed",
            EventKind::PlayStateChanged { .. } => "playback.play_state_changed",
            EventKind::FpsChanged { .. } => "playback.fps_changed",
            EventKind::RangeChanged { .. } => "range.changed",
            EventKind::AnnotationsChanged { .. } => "annotations.changed",
            EventKind::LoopWrapped { .. } => "loop.wrapped",
            EventKind::LoopMisconfigured { .. } => "loop.misconfigured",
            EventKind::Error { .. } => "session.error",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Events buffered per subscriber before the slowest one starts lagging.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out of [`SessionEvent`]s to every live subscriber.
///
/// ```rust
/// use framemark_events::{EventBus, EventKind, SessionEvent};
///
/// let bus = EventBus::default();
/// let mut events = bus.subscribe();
/// bus.publish(SessionEvent::new(EventKind::VideosLoaded { count: 3 }));
/// assert_eq!(events.try_recv().unwrap().event_type(), "videos.loaded");
/// ```
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// A subscriber more than `capacity` events behind loses the oldest ones
    /// and sees `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        Self {
            sender: broadcast::Sender::new(capacity),
        }
    }

    /// No-op without subscribers.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }

    /// Receives every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[tokio::test]
    async fn scoped_event_reaches_subscriber() {
        let bus = EventBus::default();
        let mut events = bus.subscribe();

        bus.publish(SessionEvent::new(EventKind::AnnotationsChanged { count: 2 }).with_video("clip"));

        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type(), "annotations.changed");
        assert_eq!(event.video_id.as_deref(), Some("clip"));
        assert_matches!(event.kind, EventKind::AnnotationsChanged { count: 2 });
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(SessionEvent::new(EventKind::PlayStateChanged { playing: true }));

        assert_eq!(first.recv().await.unwrap().kind, second.recv().await.unwrap().kind);
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::default();
        bus.publish(SessionEvent::new(EventKind::VideoDeselected));

        let mut events = bus.subscribe();
        assert_matches!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn slow_subscriber_lags() {
        let bus = EventBus::new(2);
        let mut events = bus.subscribe();
        for count in 0..3 {
            bus.publish(SessionEvent::new(EventKind::VideosLoaded { count }));
        }

        assert_matches!(events.recv().await, Err(RecvError::Lagged(1)));
        assert_matches!(
            events.recv().await.unwrap().kind,
            EventKind::VideosLoaded { count: 1 }
        );
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = SessionEvent::new(EventKind::RangeChanged {
            range: FrameRange {
                start_frame: 30,
                end_frame: 60,
            },
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "range_changed");
        assert_eq!(value["range"]["startFrame"], 30);
        assert!(value["video_id"].is_null());
    }
}
