//! Command loop driving a [`ReviewSession`] from a spawned task.
//!
//! UI code sends [`Command`]s and never waits on the store; outcomes arrive
//! as [`SessionEvent`](framemark_events::SessionEvent)s on the session's
//! event bus. Commands are applied strictly in order, so the task is the
//! single writer of the session state.

use std::sync::Arc;

use framemark_core::range::FrameRange;
use framemark_core::types::{AnnotationId, FrameIndex, VideoId};
use framemark_events::{EventBus, SessionEvent};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::session::{ReviewSession, SessionSnapshot};

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 256;

/// One request to the session task.
#[derive(Debug)]
pub enum Command {
    LoadVideos,
    SelectVideo(VideoId),
    Deselect,
    LoadAnnotations,
    SetRange(FrameRange),
    /// Time reported by the playback element.
    PlaybackTime(f64),
    SeekTo(f64),
    SeekToFrame(FrameIndex),
    StepFrame(FrameIndex),
    TogglePlay,
    SetPlaying(bool),
    SetFps(f64),
    SetLoopEnabled(bool),
    SetRating(u8),
    AddTag(String),
    RemoveTag(String),
    SetNotes(String),
    ClearCurrent,
    DeleteAnnotation(AnnotationId),
    ClearError,
    Snapshot(oneshot::Sender<SessionSnapshot>),
    /// Seek channel of the current clock; `None` without a selected video.
    SubscribeSeeks(oneshot::Sender<Option<watch::Receiver<f64>>>),
}

/// The session task stopped; no more commands are accepted.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("Session task is no longer running")]
pub struct SessionClosed;

/// Cheap handle to a session running in its own task.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    bus: Arc<EventBus>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Move `session` into a new task and return its handle.
    pub fn spawn(session: ReviewSession) -> Self {
        let bus = session.bus().clone();
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run(session, rx));
        Self {
            commands,
            bus,
            task,
        }
    }

    /// Events published by the session.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    /// Queue a command. Waits only for channel capacity.
    pub async fn send(&self, command: Command) -> Result<(), SessionClosed> {
        self.commands.send(command).await.map_err(|_| SessionClosed)
    }

    /// State after every previously sent command has been applied.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionClosed> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| SessionClosed)
    }

    pub async fn subscribe_seeks(&self) -> Result<Option<watch::Receiver<f64>>, SessionClosed> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SubscribeSeeks(tx)).await?;
        rx.await.map_err(|_| SessionClosed)
    }

    /// Stop accepting commands and wait for the queued ones to finish.
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Session task failed");
        }
    }
}

async fn run(mut session: ReviewSession, mut commands: mpsc::Receiver<Command>) {
    tracing::debug!("Session task started");
    while let Some(command) = commands.recv().await {
        apply(&mut session, command).await;
    }
    tracing::debug!("Session task stopped");
}

/// Apply one command. Failures are already recorded in the session and
/// published on the bus, so they are only traced here.
async fn apply(session: &mut ReviewSession, command: Command) {
    let outcome = match command {
        Command::LoadVideos => session.load_videos().await,
        Command::SelectVideo(id) => session.select_video(&id).await,
        Command::Deselect => {
            session.deselect();
            Ok(())
        }
        Command::LoadAnnotations => session.load_annotations().await,
        Command::SetRange(range) => {
            session.set_range(range);
            Ok(())
        }
        Command::PlaybackTime(time) => {
            session.on_playback_time(time);
            Ok(())
        }
        Command::SeekTo(time) => {
            session.seek_to(time);
            Ok(())
        }
        Command::SeekToFrame(frame) => {
            session.seek_to_frame(frame);
            Ok(())
        }
        Command::StepFrame(delta) => {
            session.step_frame(delta);
            Ok(())
        }
        Command::TogglePlay => {
            session.toggle_play();
            Ok(())
        }
        Command::SetPlaying(playing) => {
            session.set_playing(playing);
            Ok(())
        }
        Command::SetFps(fps) => {
            session.set_fps(fps);
            Ok(())
        }
        Command::SetLoopEnabled(enabled) => {
            session.set_loop_enabled(enabled);
            Ok(())
        }
        Command::SetRating(rating) => session.set_rating(rating).await,
        Command::AddTag(tag) => session.add_tag(&tag).await.map(drop),
        Command::RemoveTag(tag) => session.remove_tag(&tag).await,
        Command::SetNotes(notes) => session.set_notes(&notes).await,
        Command::ClearCurrent => session.clear_current().await.map(drop),
        Command::DeleteAnnotation(id) => session.delete_annotation(&id).await,
        Command::ClearError => {
            session.clear_error();
            Ok(())
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(session.snapshot());
            Ok(())
        }
        Command::SubscribeSeeks(reply) => {
            let _ = reply.send(session.subscribe_seeks());
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::debug!(error = %e, "Session command failed");
    }
}
