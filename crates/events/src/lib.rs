//! Session change notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`SessionEvent`]: what changed in a review session, and when.

pub mod bus;

pub use bus::{EventBus, EventKind, SessionEvent};
