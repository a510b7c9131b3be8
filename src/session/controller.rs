use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::{
    AudioOutput, AudioPlayer, EngineEvent, MediaLoader, OutputFactory, PlaybackState,
};
use crate::catalog::{Catalog, Track};
use crate::config::Settings;
use crate::download::Downloader;
use crate::error::{CatalogError, DownloadError};
use crate::handoff::{
    BackgroundLink, Coordinator, LifecycleEvent, PlayerForeground, ServiceCmd, ServiceEvent,
    ServiceLink,
};
use crate::observe::Observable;
use crate::playlist::{ListTag, PlaylistRegistry};

use super::notice::Notice;
use super::ticker::ProgressTicker;

enum Reply {
    Track {
        generation: u64,
        auto_play: bool,
        result: Result<Track, CatalogError>,
    },
    List {
        generation: u64,
        tag: ListTag,
        result: Result<Vec<Track>, CatalogError>,
    },
    Download {
        result: Result<Track, DownloadError>,
    },
}

/// Collaborators the controller is built from.
pub struct SessionDeps {
    pub catalog: Arc<dyn Catalog>,
    pub registry: Arc<PlaylistRegistry>,
    pub downloader: Arc<Downloader>,
    pub loader: Arc<dyn MediaLoader>,
}

pub struct SessionController {
    catalog: Arc<dyn Catalog>,
    registry: Arc<PlaylistRegistry>,
    downloader: Arc<Downloader>,
    player: AudioPlayer,
    coordinator: Coordinator<PlayerForeground, Box<dyn BackgroundLink>>,
    ticker: Option<ProgressTicker>,
    // Opened while an abandoned service still held output; (url, auto_play).
    pending_prepare: Option<(String, bool)>,

    progress_interval: Duration,
    preview_cap_ms: u64,
    auto_advance: bool,

    // Only replies carrying the latest generation are applied.
    track_generation: u64,
    list_generation: u64,

    replies_tx: Sender<Reply>,
    replies: Receiver<Reply>,
    engine_events: Receiver<EngineEvent>,
    service_events: Receiver<ServiceEvent>,

    current_track: Observable<Option<Track>>,
    progress_ms: Observable<u64>,
    duration_ms: Observable<u64>,
    notice: Observable<Option<Notice>>,
    loading: Observable<bool>,
}

impl SessionController {
    pub fn new<O: AudioOutput + 'static>(
        settings: &Settings,
        deps: SessionDeps,
        factory: OutputFactory<O>,
    ) -> Self {
        let (engine_tx, engine_events) = mpsc::channel();
        let player = AudioPlayer::spawn(Arc::clone(&factory), Arc::clone(&deps.loader), engine_tx);

        let (service_tx, service_events) = mpsc::channel();
        let link: Box<dyn BackgroundLink> = Box::new(ServiceLink::new(
            factory,
            Arc::clone(&deps.loader),
            service_tx,
            Duration::from_millis(settings.handoff.tick_interval_ms),
        ));
        let coordinator = Coordinator::new(
            PlayerForeground::new(player.clone()),
            link,
            Duration::from_millis(settings.handoff.ack_timeout_ms),
        );

        let (replies_tx, replies) = mpsc::channel();

        Self {
            catalog: deps.catalog,
            registry: deps.registry,
            downloader: deps.downloader,
            player,
            coordinator,
            ticker: None,
            pending_prepare: None,
            progress_interval: Duration::from_millis(settings.playback.progress_interval_ms),
            preview_cap_ms: settings.playback.preview_cap_ms,
            auto_advance: settings.playback.auto_advance,
            track_generation: 0,
            list_generation: 0,
            replies_tx,
            replies,
            engine_events,
            service_events,
            current_track: Observable::new(None),
            progress_ms: Observable::new(0),
            duration_ms: Observable::new(0),
            notice: Observable::new(None),
            loading: Observable::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<PlaylistRegistry> {
        &self.registry
    }

    pub fn current_track(&self) -> Observable<Option<Track>> {
        self.current_track.clone()
    }

    pub fn progress(&self) -> Observable<u64> {
        self.progress_ms.clone()
    }

    pub fn duration(&self) -> Observable<u64> {
        self.duration_ms.clone()
    }

    pub fn notice(&self) -> Observable<Option<Notice>> {
        self.notice.clone()
    }

    pub fn loading(&self) -> Observable<bool> {
        self.loading.clone()
    }

    /// Foreground engine state; `Idle` while a background service owns playback.
    pub fn playback_state(&self) -> Observable<PlaybackState> {
        self.player.state_observable()
    }

    pub fn is_playing(&self) -> bool {
        match self.coordinator.background_progress() {
            Some((_, playing)) => playing,
            None => self.player.is_playing(),
        }
    }

    pub fn is_handed_off(&self) -> bool {
        self.coordinator.is_handed_off()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(ProgressTicker::is_running)
    }

    pub fn clear_notice(&self) {
        self.notice.set(None);
    }

    /// Open the track with `id`. A downloaded copy is used when present;
    /// otherwise metadata is fetched from the catalog. The most recent call
    /// wins regardless of completion order.
    pub fn load_track(&mut self, id: &str, auto_play: bool) {
        self.track_generation += 1;
        let generation = self.track_generation;

        if let Some(local) = self.registry.downloaded_track(id) {
            debug!(id, "opening downloaded copy");
            self.open(local, auto_play);
            return;
        }

        self.loading.set(true);
        let catalog = Arc::clone(&self.catalog);
        let tx = self.replies_tx.clone();
        let id = id.to_string();
        thread::spawn(move || {
            let result = catalog.track_by_id(&id);
            let _ = tx.send(Reply::Track {
                generation,
                auto_play,
                result,
            });
        });
    }

    pub fn next_track(&mut self) {
        match self.registry.next_track() {
            Some(track) => self.open_adjacent(track),
            None => debug!("no next track"),
        }
    }

    pub fn previous_track(&mut self) {
        match self.registry.previous_track() {
            Some(track) => self.open_adjacent(track),
            None => debug!("no previous track"),
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if let Some((_, auto_play)) = self.pending_prepare.as_mut() {
            *auto_play = !*auto_play;
            return;
        }
        if !self.coordinator.forward(ServiceCmd::TogglePlayPause) {
            self.player.toggle_play_pause();
        }
    }

    pub fn skip_forward(&mut self) {
        if !self.coordinator.forward(ServiceCmd::SkipForward) {
            self.player.skip_forward();
        }
    }

    pub fn skip_backward(&mut self) {
        if !self.coordinator.forward(ServiceCmd::SkipBackward) {
            self.player.skip_backward();
        }
    }

    pub fn seek_to(&mut self, position: Duration) {
        if !self.coordinator.forward(ServiceCmd::SeekTo(position)) {
            self.player.seek_to(position);
        }
    }

    pub fn load_top(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        self.request_list(ListTag::Top, move || catalog.top_tracks());
    }

    pub fn search(&mut self, query: &str) {
        let catalog = Arc::clone(&self.catalog);
        let query = query.to_string();
        self.request_list(ListTag::Search, move || catalog.search_tracks(&query));
    }

    pub fn show_downloads(&mut self) {
        self.list_generation += 1;
        self.registry.activate(ListTag::Downloaded);
    }

    pub fn filter_downloaded(&mut self, query: &str) {
        self.list_generation += 1;
        self.registry.filter_downloaded(query);
    }

    /// Save `track`'s preview for offline use.
    pub fn download(&mut self, track: &Track) {
        if self.registry.is_track_downloaded(&track.id) {
            self.notice
                .set(Some(Notice::info(format!("Already saved: {}", track.display()))));
            return;
        }
        let downloader = Arc::clone(&self.downloader);
        let tx = self.replies_tx.clone();
        let track = track.clone();
        thread::spawn(move || {
            let result = downloader.download(&track);
            let _ = tx.send(Reply::Download { result });
        });
    }

    pub fn on_lifecycle(&mut self, event: LifecycleEvent) {
        self.coordinator.on_lifecycle(event, Instant::now());
    }

    /// Apply everything that finished since the last call.
    pub fn pump(&mut self) {
        while let Ok(reply) = self.replies.try_recv() {
            self.apply_reply(reply);
        }
        while let Ok(event) = self.engine_events.try_recv() {
            self.apply_engine_event(event);
        }
        while let Ok(event) = self.service_events.try_recv() {
            self.coordinator.on_service_event(event);
        }
        self.coordinator.poll(Instant::now());

        if let Some((url, auto_play)) = self.pending_prepare.take() {
            if self.coordinator.is_clear() {
                debug!(%url, "background service gone; preparing");
                self.player.prepare(&url, auto_play, Duration::ZERO);
            } else {
                self.pending_prepare = Some((url, auto_play));
            }
        }

        if let Some((position, _)) = self.coordinator.background_progress() {
            self.progress_ms
                .set((position.as_millis() as u64).min(self.preview_cap_ms));
        }
    }

    /// Stop ticking, background playback and the engine thread. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.pending_prepare = None;
        self.coordinator.shutdown();
        self.player.quit();
    }

    fn request_list<F>(&mut self, tag: ListTag, fetch: F)
    where
        F: FnOnce() -> Result<Vec<Track>, CatalogError> + Send + 'static,
    {
        self.list_generation += 1;
        let generation = self.list_generation;
        self.loading.set(true);
        let tx = self.replies_tx.clone();
        thread::spawn(move || {
            let result = fetch();
            let _ = tx.send(Reply::List {
                generation,
                tag,
                result,
            });
        });
    }

    fn apply_reply(&mut self, reply: Reply) {
        match reply {
            Reply::Track {
                generation,
                auto_play,
                result,
            } => {
                if generation != self.track_generation {
                    debug!(generation, "dropping stale track load");
                    return;
                }
                self.loading.set(false);
                match result {
                    Ok(track) => self.open(track, auto_play),
                    Err(e) => {
                        warn!(error = %e, "track load failed");
                        self.notice.set(Some(Notice::from(&e)));
                    }
                }
            }
            Reply::List {
                generation,
                tag,
                result,
            } => {
                if generation != self.list_generation {
                    debug!(generation, list = tag.label(), "dropping stale list");
                    return;
                }
                self.loading.set(false);
                match result {
                    Ok(tracks) => {
                        self.registry.set_list(tag, tracks);
                        self.notice.set(None);
                    }
                    Err(e) => {
                        warn!(error = %e, list = tag.label(), "list load failed");
                        self.notice.set(Some(Notice::from(&e)));
                    }
                }
            }
            Reply::Download { result } => match result {
                Ok(local) => {
                    let label = local.display();
                    if self.registry.add_track(local) {
                        info!(track = %label, "saved for offline playback");
                    }
                    // Downloads are current now; older list replies must not switch away.
                    self.list_generation += 1;
                    self.notice.set(Some(Notice::info(format!("Saved: {label}"))));
                }
                Err(e) => {
                    warn!(error = %e, "download failed");
                    self.notice.set(Some(Notice::from(&e)));
                }
            },
        }
    }

    fn apply_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Ready { url, duration } => {
                if !self.is_current_url(&url) {
                    return;
                }
                if let Some(d) = duration {
                    self.duration_ms
                        .set((d.as_millis() as u64).min(self.preview_cap_ms));
                }
            }
            EngineEvent::PrepareFailed { url, reason } => {
                if self.is_current_url(&url) {
                    self.notice
                        .set(Some(Notice::error(format!("Cannot play this preview: {reason}"))));
                }
            }
            EngineEvent::Completed { url } => {
                if !self.is_current_url(&url) {
                    return;
                }
                self.progress_ms.set(self.duration_ms.get());
                if self.auto_advance {
                    self.next_track();
                }
            }
        }
    }

    fn is_current_url(&self, url: &str) -> bool {
        self.current_track
            .get()
            .is_some_and(|track| track.preview == url)
    }

    /// Open a registry neighbour directly, superseding any in-flight load.
    fn open_adjacent(&mut self, track: Track) {
        self.track_generation += 1;
        self.open(track, true);
    }

    fn open(&mut self, track: Track, auto_play: bool) {
        // A new track in the foreground supersedes background playback.
        self.pending_prepare = None;
        self.coordinator.abandon();

        debug!(id = %track.id, auto_play, "opening track");
        self.registry.set_current_track(&track.id);
        self.duration_ms
            .set((u64::from(track.duration) * 1000).min(self.preview_cap_ms));
        self.progress_ms.set(0);
        if self.coordinator.is_clear() {
            self.player.prepare(&track.preview, auto_play, Duration::ZERO);
        } else {
            debug!(id = %track.id, "waiting for the background service to release output");
            self.pending_prepare = Some((track.preview.clone(), auto_play));
        }
        self.current_track.set(Some(track));
        self.loading.set(false);
        self.ensure_ticking();
    }

    fn ensure_ticking(&mut self) {
        if self.is_ticking() {
            return;
        }
        self.ticker = Some(ProgressTicker::spawn(
            self.progress_interval,
            self.player.state_observable(),
            self.player.playback_handle(),
            self.progress_ms.clone(),
            self.preview_cap_ms,
        ));
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
