//! Background continuity.
//!
//! When the app leaves the foreground while something is playing, playback
//! is captured, the foreground engine is released, and a background service
//! resumes from the captured position. Returning to the foreground asks the
//! service for its position and resumes there. Each handoff carries an id;
//! service messages with any other id are ignored.

mod coordinator;
mod foreground;
mod lifecycle;
mod service;
mod types;

pub use coordinator::*;
pub use foreground::*;
pub use lifecycle::*;
pub use service::*;
pub use types::*;
