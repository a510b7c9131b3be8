//! Seams between the engine and the platform audio stack.

use std::sync::Arc;
use std::time::Duration;

use crate::error::EngineError;

/// Fetched, not yet decoded, audio bytes.
#[derive(Clone)]
pub struct Media {
    url: String,
    bytes: Arc<[u8]>,
}

impl Media {
    pub fn new(url: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            bytes: Arc::from(bytes),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }
}

impl std::fmt::Debug for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Media")
            .field("url", &self.url)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A live decode resource. Dropping it releases the resource.
pub trait Voice {
    fn play(&mut self);
    fn pause(&mut self);
    /// Absolute seek. Out-of-range targets are handled however the
    /// underlying decoder handles them.
    fn seek(&mut self, position: Duration);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn is_finished(&self) -> bool;
    fn stop(&mut self);
}

/// An audio output able to turn media into a paused voice.
pub trait AudioOutput {
    type Voice: Voice;

    fn acquire(&mut self, media: &Media) -> Result<Self::Voice, EngineError>;
}

/// Fetches media bytes. Runs off the engine thread.
pub trait MediaLoader: Send + Sync {
    fn load(&self, url: &str) -> Result<Media, EngineError>;
}

/// Builds an output on the thread that will own it.
pub type OutputFactory<O> = Arc<dyn Fn() -> Result<O, EngineError> + Send + Sync>;
