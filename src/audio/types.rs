//! Audio-related small types and handles.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Lifecycle of the engine's current track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Media is being fetched; no voice is held yet.
    Preparing,
    /// Voice acquired, not started.
    Ready,
    Playing,
    Paused,
    /// The voice ran to its end.
    Completed,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Stopped",
            Self::Preparing => "Loading",
            Self::Ready => "Ready",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Completed => "Finished",
        }
    }
}

/// Position and timing of the current track, refreshed by the engine thread.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    pub url: Option<String>,
    pub position: Duration,
    pub duration: Option<Duration>,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// Where playback stood at the moment it was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub url: String,
    pub position: Duration,
    pub playing: bool,
}

#[derive(Debug)]
pub enum EngineCmd {
    /// Release the current voice and load `url`, starting at `start_at`.
    Prepare {
        url: String,
        auto_play: bool,
        start_at: Duration,
    },
    TogglePlayPause,
    /// Seek forward by [`SKIP_OFFSET`](super::SKIP_OFFSET).
    SkipForward,
    /// Seek backward by [`SKIP_OFFSET`](super::SKIP_OFFSET).
    SkipBackward,
    SeekTo(Duration),
    Release,
    /// If playing, capture a snapshot and release; reply `None` otherwise.
    DetachPlaying {
        reply: Sender<Option<PlaybackSnapshot>>,
    },
    /// Release everything and stop the engine thread.
    Quit,
}

/// Discrete engine notifications. State changes go through the state observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Ready {
        url: String,
        duration: Option<Duration>,
    },
    PrepareFailed {
        url: String,
        reason: String,
    },
    Completed {
        url: String,
    },
}
