//! The playback state machine.
//!
//! `PlaybackEngine` is synchronous: the engine thread feeds it commands and
//! finished loads, and calls [`PlaybackEngine::poll`] between them. It holds
//! at most one voice, and releases the previous one before anything new is
//! prepared.

use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::observe::Observable;

use super::backend::{AudioOutput, Media, Voice};
use super::types::{EngineEvent, PlaybackHandle, PlaybackInfo, PlaybackSnapshot, PlaybackState};

/// Distance covered by one skip forward or backward.
pub const SKIP_OFFSET: Duration = Duration::from_secs(10);

/// Identifies one prepare request. Loads carrying an older generation are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub url: String,
}

struct Pending {
    generation: u64,
    url: String,
    auto_play: bool,
    start_at: Duration,
}

pub struct PlaybackEngine<O: AudioOutput> {
    output: O,
    voice: Option<O::Voice>,
    // Kept so a completed track can replay without a re-fetch.
    media: Option<Media>,
    url: Option<String>,
    phase: PlaybackState,
    generation: u64,
    pending: Option<Pending>,
    state: Observable<PlaybackState>,
    info: PlaybackHandle,
    events: Sender<EngineEvent>,
}

impl<O: AudioOutput> PlaybackEngine<O> {
    pub fn new(
        output: O,
        state: Observable<PlaybackState>,
        info: PlaybackHandle,
        events: Sender<EngineEvent>,
    ) -> Self {
        Self {
            output,
            voice: None,
            media: None,
            url: None,
            phase: PlaybackState::Idle,
            generation: 0,
            pending: None,
            state,
            info,
            events,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.phase
    }

    pub fn has_voice(&self) -> bool {
        self.voice.is_some()
    }

    /// Begin preparing `url`. The current voice is released first.
    pub fn prepare(&mut self, url: &str, auto_play: bool, start_at: Duration) -> LoadTicket {
        self.drop_voice();
        self.media = None;
        self.generation += 1;
        self.url = Some(url.to_string());
        self.pending = Some(Pending {
            generation: self.generation,
            url: url.to_string(),
            auto_play,
            start_at,
        });
        self.write_info(|info| {
            *info = PlaybackInfo {
                url: Some(url.to_string()),
                position: start_at,
                duration: None,
            }
        });
        self.set_state(PlaybackState::Preparing);
        LoadTicket {
            generation: self.generation,
            url: url.to_string(),
        }
    }

    /// Complete the prepare identified by `generation`.
    pub fn finish_prepare(&mut self, generation: u64, loaded: Result<Media, EngineError>) {
        let Some(pending) = self.pending.take_if(|p| p.generation == generation) else {
            debug!(generation, "dropping stale load");
            return;
        };

        let voice = loaded.and_then(|media| {
            let voice = self.output.acquire(&media)?;
            Ok((media, voice))
        });

        match voice {
            Ok((media, mut voice)) => {
                if !pending.start_at.is_zero() {
                    voice.seek(pending.start_at);
                }
                let duration = voice.duration();
                let position = voice.position();
                self.voice = Some(voice);
                self.media = Some(media);
                self.write_info(|info| {
                    info.position = position;
                    info.duration = duration;
                });
                self.set_state(PlaybackState::Ready);
                let _ = self.events.send(EngineEvent::Ready {
                    url: pending.url,
                    duration,
                });
                if pending.auto_play {
                    self.play();
                }
            }
            Err(e) => self.fail(pending.url, e),
        }
    }

    pub fn toggle_play_pause(&mut self) {
        match self.phase {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Completed => self.play(),
            PlaybackState::Idle | PlaybackState::Preparing => {}
        }
    }

    pub fn play(&mut self) {
        match self.phase {
            PlaybackState::Ready | PlaybackState::Paused => {
                if let Some(voice) = self.voice.as_mut() {
                    voice.play();
                    self.set_state(PlaybackState::Playing);
                }
            }
            PlaybackState::Completed => self.replay(),
            _ => {}
        }
    }

    pub fn pause(&mut self) {
        if self.phase != PlaybackState::Playing {
            return;
        }
        if let Some(voice) = self.voice.as_mut() {
            voice.pause();
        }
        self.refresh_position();
        self.set_state(PlaybackState::Paused);
    }

    pub fn skip_forward(&mut self) {
        let target = self.current_position() + SKIP_OFFSET;
        self.seek_to(target);
    }

    pub fn skip_backward(&mut self) {
        let target = self.current_position().saturating_sub(SKIP_OFFSET);
        self.seek_to(target);
    }

    /// Absolute seek. Only meaningful while a track is loaded and not finished.
    pub fn seek_to(&mut self, position: Duration) {
        if !matches!(
            self.phase,
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused
        ) {
            return;
        }
        if let Some(voice) = self.voice.as_mut() {
            voice.seek(position);
        }
        self.refresh_position();
    }

    pub fn current_position(&self) -> Duration {
        self.voice
            .as_ref()
            .map_or(Duration::ZERO, |voice| voice.position())
    }

    /// Release the voice and cancel any in-flight prepare. Idempotent.
    pub fn release(&mut self) {
        self.drop_voice();
        self.media = None;
        self.url = None;
        self.pending = None;
        self.write_info(|info| *info = PlaybackInfo::default());
        self.set_state(PlaybackState::Idle);
    }

    /// If playing, capture where playback stands and release everything.
    pub fn detach_playing(&mut self) -> Option<PlaybackSnapshot> {
        if self.phase != PlaybackState::Playing {
            return None;
        }
        let snapshot = PlaybackSnapshot {
            url: self.url.clone()?,
            position: self.current_position(),
            playing: true,
        };
        self.release();
        Some(snapshot)
    }

    /// Capture and release regardless of state. `None` only when nothing is loaded.
    pub fn detach(&mut self) -> Option<PlaybackSnapshot> {
        let url = self.url.clone()?;
        let snapshot = PlaybackSnapshot {
            url,
            position: self.current_position(),
            playing: self.phase.is_playing(),
        };
        self.release();
        Some(snapshot)
    }

    /// Refresh the shared position and notice when the voice ran out.
    pub fn poll(&mut self) {
        if self.voice.is_none() {
            return;
        }
        self.refresh_position();

        let finished = self.voice.as_ref().is_some_and(|voice| voice.is_finished());
        if self.phase == PlaybackState::Playing && finished {
            self.set_state(PlaybackState::Completed);
            if let Some(url) = self.url.clone() {
                let _ = self.events.send(EngineEvent::Completed { url });
            }
        }
    }

    fn replay(&mut self) {
        let Some(media) = self.media.clone() else {
            return;
        };
        self.drop_voice();
        match self.output.acquire(&media) {
            Ok(mut voice) => {
                voice.play();
                self.voice = Some(voice);
                self.refresh_position();
                self.set_state(PlaybackState::Playing);
            }
            Err(e) => {
                self.media = None;
                self.fail(media.url().to_string(), e);
            }
        }
    }

    fn fail(&mut self, url: String, e: EngineError) {
        warn!(url = %url, error = %e, "prepare failed");
        self.drop_voice();
        self.url = None;
        self.write_info(|info| *info = PlaybackInfo::default());
        self.set_state(PlaybackState::Idle);
        let _ = self.events.send(EngineEvent::PrepareFailed {
            url,
            reason: e.to_string(),
        });
    }

    fn drop_voice(&mut self) {
        if let Some(mut voice) = self.voice.take() {
            voice.stop();
        }
    }

    fn refresh_position(&self) {
        let position = self.current_position();
        self.write_info(|info| info.position = position);
    }

    fn write_info(&self, f: impl FnOnce(&mut PlaybackInfo)) {
        if let Ok(mut info) = self.info.lock() {
            f(&mut info);
        }
    }

    fn set_state(&mut self, next: PlaybackState) {
        if self.phase == next {
            return;
        }
        debug!(from = ?self.phase, to = ?next, "playback state");
        self.phase = next;
        self.state.set(next);
    }
}
