//! Client side of framemark: HTTP-backed store and catalog, and the review
//! session that ties the playback clock, range binder, loop controller and
//! annotation store together.

pub mod handle;
pub mod http;
pub mod session;

pub use handle::{Command, SessionClosed, SessionHandle};
pub use http::{ApiClient, HttpAnnotationStore, HttpVideoCatalog};
pub use session::{ReviewSession, SessionError, SessionSnapshot};
