//! The `AudioPlayer` handle used by the rest of the app.

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::observe::Observable;

use super::backend::{AudioOutput, MediaLoader, OutputFactory};
use super::thread::{EngineShared, Msg, spawn_engine_thread};
use super::types::{EngineCmd, EngineEvent, PlaybackHandle, PlaybackInfo, PlaybackSnapshot, PlaybackState};

/// Cloneable handle to the engine thread.
///
/// The engine's state observable is the single source of truth for whether
/// anything is playing.
#[derive(Clone)]
pub struct AudioPlayer {
    tx: Sender<Msg>,
    state: Observable<PlaybackState>,
    info: PlaybackHandle,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AudioPlayer {
    pub fn spawn<O: AudioOutput + 'static>(
        factory: OutputFactory<O>,
        loader: Arc<dyn MediaLoader>,
        events: Sender<EngineEvent>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let state = Observable::new(PlaybackState::Idle);
        let info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let handle = spawn_engine_thread(
            factory,
            loader,
            tx.clone(),
            rx,
            EngineShared {
                state: state.clone(),
                info: Arc::clone(&info),
                events,
            },
        );

        Self {
            tx,
            state,
            info,
            join: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Queue a command. Returns `false` once the engine thread is gone.
    pub fn send(&self, cmd: EngineCmd) -> bool {
        self.tx.send(Msg::Cmd(cmd)).is_ok()
    }

    pub fn prepare(&self, url: &str, auto_play: bool, start_at: Duration) {
        self.send(EngineCmd::Prepare {
            url: url.to_string(),
            auto_play,
            start_at,
        });
    }

    pub fn toggle_play_pause(&self) {
        self.send(EngineCmd::TogglePlayPause);
    }

    pub fn skip_forward(&self) {
        self.send(EngineCmd::SkipForward);
    }

    pub fn skip_backward(&self) {
        self.send(EngineCmd::SkipBackward);
    }

    pub fn seek_to(&self, position: Duration) {
        self.send(EngineCmd::SeekTo(position));
    }

    pub fn release(&self) {
        self.send(EngineCmd::Release);
    }

    /// Capture and release current playback if it is playing.
    ///
    /// Blocks until the engine thread has released its voice and answered.
    /// `None` once the thread is gone.
    pub fn detach_playing(&self) -> Option<PlaybackSnapshot> {
        let (reply, rx) = mpsc::channel();
        if !self.send(EngineCmd::DetachPlaying { reply }) {
            return None;
        }
        rx.recv().ok().flatten()
    }

    pub fn state(&self) -> PlaybackState {
        self.state.get()
    }

    pub fn state_observable(&self) -> Observable<PlaybackState> {
        self.state.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    /// Last position sampled by the engine thread.
    pub fn current_position(&self) -> Duration {
        self.info.lock().map_or(Duration::ZERO, |info| info.position)
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        Arc::clone(&self.info)
    }

    /// Stop the engine thread and wait for it to release its output.
    pub fn quit(&self) {
        self.send(EngineCmd::Quit);
        let handle = self.join.lock().ok().and_then(|mut guard| guard.take());
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}
