//! Shared playlist state: four named track lists and the playback context.
//!
//! The `PlaylistRegistry` is created once at startup from the persisted
//! downloaded list and injected wherever lists are produced or consumed.

mod registry;
mod store;

pub use registry::*;
pub use store::*;

#[cfg(test)]
mod tests;
