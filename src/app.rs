//! Application module: the view model used by the TUI and runtime.
//!
//! `App` holds cursor, input mode and the simulated-background toggle. The
//! lists themselves live in the playlist registry.

mod model;

pub use model::*;
