//! Audio playback: the engine state machine and the thread that owns it.
//!
//! The `PlaybackEngine` holds at most one decode resource (`Voice`) at a
//! time. It is driven by a dedicated thread that owns the audio output;
//! callers talk to it through the cloneable `AudioPlayer` handle.

mod backend;
mod engine;
mod loader;
mod player;
mod sink;
mod thread;
mod types;

pub use backend::*;
pub use engine::*;
pub use loader::*;
pub use player::*;
pub use sink::*;
pub use types::*;
