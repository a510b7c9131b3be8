//! The background playback service.
//!
//! Each handoff runs on its own thread with its own output and engine. The
//! service resumes from the captured position, reports progress on a fixed
//! tick, and on `Stop` or `RequestPosition` releases everything before
//! sending its final acknowledgement. It never advances to another track.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::audio::{
    AudioOutput, EngineEvent, MediaLoader, OutputFactory, PlaybackEngine, PlaybackInfo,
    PlaybackSnapshot, PlaybackState,
};
use crate::observe::Observable;

use super::coordinator::BackgroundLink;
use super::types::{ServiceCmd, ServiceEvent, ServiceEventKind};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Running {
    handoff: u64,
    tx: Sender<ServiceCmd>,
    join: JoinHandle<()>,
}

/// Spawns background services on demand.
pub struct ServiceLink<O: AudioOutput> {
    factory: OutputFactory<O>,
    loader: Arc<dyn MediaLoader>,
    events: Sender<ServiceEvent>,
    tick: Duration,
    current: Option<Running>,
}

impl<O: AudioOutput + 'static> ServiceLink<O> {
    pub fn new(
        factory: OutputFactory<O>,
        loader: Arc<dyn MediaLoader>,
        events: Sender<ServiceEvent>,
        tick: Duration,
    ) -> Self {
        Self {
            factory,
            loader,
            events,
            tick,
            current: None,
        }
    }
}

impl<O: AudioOutput + 'static> BackgroundLink for ServiceLink<O> {
    fn start(&mut self, handoff: u64, snapshot: &PlaybackSnapshot) {
        if let Some(previous) = self.current.take() {
            // Normally already acknowledged; make sure it winds down.
            let _ = previous.tx.send(ServiceCmd::Stop);
        }

        let (tx, rx) = mpsc::channel();
        let factory = Arc::clone(&self.factory);
        let loader = Arc::clone(&self.loader);
        let events = self.events.clone();
        let tick = self.tick;
        let snapshot = snapshot.clone();

        let join = thread::spawn(move || {
            let output = match factory() {
                Ok(output) => output,
                Err(e) => {
                    warn!(handoff, error = %e, "background service has no output");
                    let _ = events.send(ServiceEvent {
                        handoff,
                        kind: ServiceEventKind::Ack {
                            position: snapshot.position,
                            playing: false,
                        },
                    });
                    return;
                }
            };
            run_service(output, loader, snapshot, handoff, rx, events, tick);
        });

        self.current = Some(Running { handoff, tx, join });
    }

    fn send(&mut self, cmd: ServiceCmd) -> bool {
        self.current
            .as_ref()
            .is_some_and(|running| running.tx.send(cmd).is_ok())
    }

    fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|running| !running.join.is_finished())
    }

    fn shutdown(&mut self) {
        if let Some(running) = self.current.take() {
            let _ = running.tx.send(ServiceCmd::Stop);
            debug!(handoff = running.handoff, "waiting for background service");
            let _ = running.join.join();
        }
    }
}

fn run_service<O: AudioOutput>(
    output: O,
    loader: Arc<dyn MediaLoader>,
    snapshot: PlaybackSnapshot,
    handoff: u64,
    rx: Receiver<ServiceCmd>,
    events: Sender<ServiceEvent>,
    tick: Duration,
) {
    let (engine_tx, engine_rx) = mpsc::channel();
    let mut engine = PlaybackEngine::new(
        output,
        Observable::new(PlaybackState::Idle),
        Arc::new(Mutex::new(PlaybackInfo::default())),
        engine_tx,
    );

    let ticket = engine.prepare(&snapshot.url, snapshot.playing, snapshot.position);
    let (loaded_tx, loaded_rx) = mpsc::channel();
    {
        let url = ticket.url.clone();
        thread::spawn(move || {
            let _ = loaded_tx.send(loader.load(&url));
        });
    }

    let mut last_tick = Instant::now();
    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(ServiceCmd::Play) => engine.play(),
            Ok(ServiceCmd::Pause) => engine.pause(),
            Ok(ServiceCmd::TogglePlayPause) => engine.toggle_play_pause(),
            Ok(ServiceCmd::SkipForward) => engine.skip_forward(),
            Ok(ServiceCmd::SkipBackward) => engine.skip_backward(),
            Ok(ServiceCmd::SeekTo(position)) => engine.seek_to(position),
            Ok(ServiceCmd::Stop | ServiceCmd::RequestPosition) => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Ok(media) = loaded_rx.try_recv() {
            engine.finish_prepare(ticket.generation, media);
        }
        engine.poll();

        if engine_rx
            .try_iter()
            .any(|e| matches!(e, EngineEvent::PrepareFailed { .. }))
        {
            warn!(handoff, "background service could not resume playback");
            break;
        }

        if last_tick.elapsed() >= tick {
            let (position, playing) = progress(&engine, &snapshot);
            let _ = events.send(ServiceEvent {
                handoff,
                kind: ServiceEventKind::Tick { position, playing },
            });
            last_tick = Instant::now();
        }
    }

    let (position, playing) = progress(&engine, &snapshot);
    engine.release();
    debug!(handoff, position_ms = position.as_millis() as u64, playing, "background service done");
    let _ = events.send(ServiceEvent {
        handoff,
        kind: ServiceEventKind::Ack { position, playing },
    });
}

/// Where the service stands. Before the voice exists this is the snapshot it started from.
fn progress<O: AudioOutput>(
    engine: &PlaybackEngine<O>,
    snapshot: &PlaybackSnapshot,
) -> (Duration, bool) {
    match engine.state() {
        PlaybackState::Preparing => (snapshot.position, snapshot.playing),
        PlaybackState::Idle => (snapshot.position, false),
        state => (engine.current_position(), state.is_playing()),
    }
}
