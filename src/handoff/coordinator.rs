use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::PlaybackSnapshot;

use super::types::{LifecycleEvent, ServiceCmd, ServiceEvent, ServiceEventKind};

/// The foreground side of a handoff.
pub trait ForegroundPlayer {
    /// If playing, capture where playback stands and release the engine.
    fn detach_playing(&self) -> Option<PlaybackSnapshot>;
    /// Resume in the foreground from `snapshot`.
    fn restore(&self, snapshot: &PlaybackSnapshot);
}

/// Starts and talks to background services.
pub trait BackgroundLink {
    /// Start a service that plays `snapshot` under the given handoff id.
    /// Any earlier service has already acknowledged or been told to stop.
    fn start(&mut self, handoff: u64, snapshot: &PlaybackSnapshot);
    /// Deliver `cmd` to the current service. `false` if none is running.
    fn send(&mut self, cmd: ServiceCmd) -> bool;
    /// Whether a service may still hold an output.
    fn is_running(&self) -> bool;
    /// Stop any running service and wait for it to exit.
    fn shutdown(&mut self) {}
}

impl<L: BackgroundLink + ?Sized> BackgroundLink for Box<L> {
    fn start(&mut self, handoff: u64, snapshot: &PlaybackSnapshot) {
        (**self).start(handoff, snapshot);
    }

    fn send(&mut self, cmd: ServiceCmd) -> bool {
        (**self).send(cmd)
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }

    fn shutdown(&mut self) {
        (**self).shutdown();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffState {
    /// The foreground engine owns playback.
    Foreground,
    /// A background service owns playback.
    HandedOff {
        handoff: u64,
        url: String,
        position: Duration,
        playing: bool,
    },
    /// Waiting for the service to report its final position.
    Reclaiming {
        handoff: u64,
        url: String,
        position: Duration,
        playing: bool,
        deadline: Instant,
    },
}

/// Serializes handoffs so exactly one side owns playback.
///
/// A background request that arrives while a reclaim is in flight is queued
/// and applied once the service acknowledges. The foreground never acquires
/// output while a service that was told to stop is still running.
pub struct Coordinator<F, L> {
    foreground: F,
    link: L,
    state: HandoffState,
    next_handoff: u64,
    queued_background: bool,
    // Paused resume held back until the timed-out service lets go.
    deferred_restore: Option<(u64, PlaybackSnapshot)>,
    ack_timeout: Duration,
}

impl<F: ForegroundPlayer, L: BackgroundLink> Coordinator<F, L> {
    pub fn new(foreground: F, link: L, ack_timeout: Duration) -> Self {
        Self {
            foreground,
            link,
            state: HandoffState::Foreground,
            next_handoff: 1,
            queued_background: false,
            deferred_restore: None,
            ack_timeout,
        }
    }

    pub fn state(&self) -> &HandoffState {
        &self.state
    }

    /// Whether a background service currently owns playback.
    pub fn is_handed_off(&self) -> bool {
        !matches!(self.state, HandoffState::Foreground)
    }

    /// Last position and play state reported by the background service.
    pub fn background_progress(&self) -> Option<(Duration, bool)> {
        match &self.state {
            HandoffState::Foreground => None,
            HandoffState::HandedOff {
                position, playing, ..
            }
            | HandoffState::Reclaiming {
                position, playing, ..
            } => Some((*position, *playing)),
        }
    }

    /// Whether the foreground may acquire output: no service is left running.
    pub fn is_clear(&self) -> bool {
        !self.link.is_running()
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent, now: Instant) {
        match (event, &self.state) {
            (LifecycleEvent::EnteredBackground, HandoffState::Foreground) => self.hand_off(),
            (LifecycleEvent::EnteredBackground, HandoffState::HandedOff { .. }) => {}
            (LifecycleEvent::EnteredBackground, HandoffState::Reclaiming { .. }) => {
                debug!("background requested during reclaim; queued");
                self.queued_background = true;
            }
            (LifecycleEvent::EnteredForeground, HandoffState::Foreground) => {}
            (LifecycleEvent::EnteredForeground, HandoffState::HandedOff { .. }) => self.reclaim(now),
            (LifecycleEvent::EnteredForeground, HandoffState::Reclaiming { .. }) => {
                self.queued_background = false;
            }
        }
    }

    /// Apply a service message. Messages from other handoffs are ignored.
    pub fn on_service_event(&mut self, event: ServiceEvent) {
        if let ServiceEventKind::Ack { position, .. } = event.kind {
            if self
                .deferred_restore
                .as_ref()
                .is_some_and(|(handoff, _)| *handoff == event.handoff)
            {
                self.resume_deferred(Some(position));
                return;
            }
        }

        let current = match &self.state {
            HandoffState::Foreground => None,
            HandoffState::HandedOff { handoff, .. } | HandoffState::Reclaiming { handoff, .. } => {
                Some(*handoff)
            }
        };
        if current != Some(event.handoff) {
            debug!(handoff = event.handoff, ?current, "ignoring stale service event");
            return;
        }

        match event.kind {
            ServiceEventKind::Tick {
                position: p,
                playing: now_playing,
            } => match &mut self.state {
                HandoffState::HandedOff {
                    position, playing, ..
                }
                | HandoffState::Reclaiming {
                    position, playing, ..
                } => {
                    *position = p;
                    *playing = now_playing;
                }
                HandoffState::Foreground => {}
            },
            ServiceEventKind::Ack { position, playing } => self.acknowledged(position, playing),
        }
    }

    /// Give up on a reclaim whose acknowledgement is overdue. The paused
    /// resume waits until the service acknowledges late or exits.
    pub fn poll(&mut self, now: Instant) {
        if self.deferred_restore.is_some() && !self.link.is_running() {
            self.resume_deferred(None);
            return;
        }

        let HandoffState::Reclaiming {
            handoff,
            url,
            position,
            deadline,
            ..
        } = &self.state
        else {
            return;
        };
        if now < *deadline {
            return;
        }

        warn!(handoff, "background service did not acknowledge; resuming paused once it exits");
        let snapshot = PlaybackSnapshot {
            url: url.clone(),
            position: *position,
            playing: false,
        };
        self.deferred_restore = Some((*handoff, snapshot));
        self.link.send(ServiceCmd::Stop);
        self.queued_background = false;
        self.state = HandoffState::Foreground;
        if !self.link.is_running() {
            self.resume_deferred(None);
        }
    }

    fn resume_deferred(&mut self, acked: Option<Duration>) {
        let Some((handoff, mut snapshot)) = self.deferred_restore.take() else {
            return;
        };
        if let Some(position) = acked {
            snapshot.position = position;
        }
        info!(handoff, position_ms = snapshot.position.as_millis() as u64, "resuming paused after overdue ack");
        self.foreground.restore(&snapshot);
    }

    /// Route a transport command to the service. `false` if the foreground owns playback.
    pub fn forward(&mut self, cmd: ServiceCmd) -> bool {
        match self.state {
            HandoffState::HandedOff { .. } => self.link.send(cmd),
            _ => false,
        }
    }

    /// Drop background playback without resuming it in the foreground.
    pub fn abandon(&mut self) {
        if self.is_handed_off() {
            debug!("abandoning background playback");
            self.link.send(ServiceCmd::Stop);
            self.state = HandoffState::Foreground;
        }
        self.queued_background = false;
        self.deferred_restore = None;
    }

    pub fn shutdown(&mut self) {
        self.abandon();
        self.link.shutdown();
    }

    fn hand_off(&mut self) {
        let Some(snapshot) = self.foreground.detach_playing() else {
            debug!("nothing playing; staying in foreground");
            return;
        };
        self.start_service(snapshot);
    }

    fn start_service(&mut self, snapshot: PlaybackSnapshot) {
        let handoff = self.next_handoff;
        self.next_handoff += 1;
        info!(handoff, url = %snapshot.url, position_ms = snapshot.position.as_millis() as u64, "handing off to background");
        self.link.start(handoff, &snapshot);
        self.state = HandoffState::HandedOff {
            handoff,
            url: snapshot.url,
            position: snapshot.position,
            playing: snapshot.playing,
        };
    }

    fn reclaim(&mut self, now: Instant) {
        let HandoffState::HandedOff {
            handoff,
            url,
            position,
            playing,
        } = &self.state
        else {
            return;
        };

        if self.link.send(ServiceCmd::RequestPosition) {
            self.state = HandoffState::Reclaiming {
                handoff: *handoff,
                url: url.clone(),
                position: *position,
                playing: *playing,
                deadline: now + self.ack_timeout,
            };
            return;
        }

        warn!(handoff, "background service is gone; resuming paused");
        let snapshot = PlaybackSnapshot {
            url: url.clone(),
            position: *position,
            playing: false,
        };
        self.state = HandoffState::Foreground;
        self.foreground.restore(&snapshot);
    }

    fn acknowledged(&mut self, position: Duration, playing: bool) {
        let state = std::mem::replace(&mut self.state, HandoffState::Foreground);
        match state {
            HandoffState::Reclaiming { handoff, url, .. } => {
                let snapshot = PlaybackSnapshot {
                    url,
                    position,
                    playing,
                };
                if std::mem::take(&mut self.queued_background) && playing {
                    debug!(handoff, "reclaim superseded by queued background request");
                    self.start_service(snapshot);
                } else {
                    info!(handoff, "reclaimed playback");
                    self.foreground.restore(&snapshot);
                }
            }
            HandoffState::HandedOff { handoff, url, .. } => {
                // The service stopped on its own.
                debug!(handoff, "background service exited");
                self.foreground.restore(&PlaybackSnapshot {
                    url,
                    position,
                    playing: false,
                });
            }
            HandoffState::Foreground => {}
        }
    }
}
