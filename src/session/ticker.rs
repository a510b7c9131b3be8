use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::audio::{PlaybackHandle, PlaybackState};
use crate::observe::Observable;

/// Publishes the foreground position at a fixed interval while playing.
///
/// Dropping the ticker stops its thread and waits for it.
pub struct ProgressTicker {
    stop: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub fn spawn(
        interval: Duration,
        state: Observable<PlaybackState>,
        info: PlaybackHandle,
        progress: Observable<u64>,
        cap_ms: u64,
    ) -> Self {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let join = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                if !state.get().is_playing() {
                    continue;
                }
                let position = info.lock().map_or(Duration::ZERO, |info| info.position);
                progress.set((position.as_millis() as u64).min(cap_ms));
            }
        });

        Self {
            stop: Some(stop),
            join: Some(join),
        }
    }

    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|join| !join.is_finished())
    }

    pub fn stop(&mut self) {
        // Disconnecting wakes the thread immediately.
        self.stop.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
