use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, error};

use crate::error::EngineError;
use crate::observe::Observable;

use super::backend::{AudioOutput, Media, MediaLoader, OutputFactory};
use super::engine::{LoadTicket, PlaybackEngine};
use super::types::{EngineCmd, EngineEvent, PlaybackHandle, PlaybackState};

/// How often the engine samples position and completion between commands.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(super) enum Msg {
    Cmd(EngineCmd),
    Loaded {
        generation: u64,
        media: Result<Media, EngineError>,
    },
}

pub(super) struct EngineShared {
    pub state: Observable<PlaybackState>,
    pub info: PlaybackHandle,
    pub events: Sender<EngineEvent>,
}

pub(super) fn spawn_engine_thread<O: AudioOutput + 'static>(
    factory: OutputFactory<O>,
    loader: Arc<dyn MediaLoader>,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
    shared: EngineShared,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // The output is opened here because audio streams are not `Send`.
        let output = match factory() {
            Ok(output) => output,
            Err(e) => {
                error!(error = %e, "no audio output; playback disabled");
                run_without_output(&rx, &shared.events, &e);
                return;
            }
        };

        let mut engine = PlaybackEngine::new(output, shared.state, shared.info, shared.events);

        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Msg::Cmd(cmd)) => match cmd {
                    EngineCmd::Prepare {
                        url,
                        auto_play,
                        start_at,
                    } => {
                        let ticket = engine.prepare(&url, auto_play, start_at);
                        spawn_load(&loader, &tx, ticket);
                    }
                    EngineCmd::TogglePlayPause => engine.toggle_play_pause(),
                    EngineCmd::SkipForward => engine.skip_forward(),
                    EngineCmd::SkipBackward => engine.skip_backward(),
                    EngineCmd::SeekTo(position) => engine.seek_to(position),
                    EngineCmd::Release => engine.release(),
                    EngineCmd::DetachPlaying { reply } => {
                        let _ = reply.send(engine.detach_playing());
                    }
                    EngineCmd::Quit => {
                        engine.release();
                        break;
                    }
                },
                Ok(Msg::Loaded { generation, media }) => engine.finish_prepare(generation, media),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    engine.release();
                    break;
                }
            }
            engine.poll();
        }
        debug!("engine thread stopped");
    })
}

fn spawn_load(loader: &Arc<dyn MediaLoader>, tx: &Sender<Msg>, ticket: LoadTicket) {
    let loader = Arc::clone(loader);
    let tx = tx.clone();
    thread::spawn(move || {
        let media = loader.load(&ticket.url);
        let _ = tx.send(Msg::Loaded {
            generation: ticket.generation,
            media,
        });
    });
}

/// Answer commands without a device so callers never wait on a dead engine.
fn run_without_output(rx: &Receiver<Msg>, events: &Sender<EngineEvent>, cause: &EngineError) {
    while let Ok(msg) = rx.recv() {
        match msg {
            Msg::Cmd(EngineCmd::Prepare { url, .. }) => {
                let _ = events.send(EngineEvent::PrepareFailed {
                    url,
                    reason: cause.to_string(),
                });
            }
            Msg::Cmd(EngineCmd::DetachPlaying { reply }) => {
                let _ = reply.send(None);
            }
            Msg::Cmd(EngineCmd::Quit) => break,
            _ => {}
        }
    }
}
