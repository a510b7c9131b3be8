//! Music catalog: track value types and the remote catalog client.
//!
//! `Track`, `Artist` and `Album` are immutable values shared by every
//! producer and consumer. The `Catalog` trait is the seam the session uses;
//! `DeezerClient` is the HTTP implementation.

mod client;
mod dto;
mod model;

pub use client::*;
pub use model::*;
