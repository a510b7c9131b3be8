//! The session layer: what a screen observes and the commands it issues.
//!
//! `SessionController` loads tracks and lists, drives the foreground player,
//! ticks progress, advances on completion and routes lifecycle transitions
//! to the handoff coordinator. It lives on the UI thread; background work
//! reports back over channels drained by [`SessionController::pump`].

mod controller;
mod notice;
mod ticker;

pub use controller::*;
pub use notice::*;
pub use ticker::*;
