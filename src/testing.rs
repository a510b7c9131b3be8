//! In-memory fakes shared by unit tests across modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::audio::{AudioOutput, Media, MediaLoader, OutputFactory, Voice};
use crate::catalog::{Album, Artist, Catalog, Track};
use crate::error::{CatalogError, EngineError, StoreError};
use crate::playlist::KeyValueStore;

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Song {id}"),
        artist: Artist {
            id: "1".to_string(),
            name: "Band".to_string(),
        },
        album: Album {
            id: "2".to_string(),
            title: "Record".to_string(),
            cover: "https://img.example/cover.jpg".to_string(),
            release_date: None,
        },
        duration: 180,
        preview: format!("https://cdn.example/{id}.mp3"),
        track_position: 1,
    }
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

pub fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}

/// Poll `cond` until it holds or two seconds pass.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        let _ = store.set(key, value);
        store
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.lock().unwrap().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Counters and controls shared by a `FakeOutput` and every voice it hands out.
#[derive(Clone, Default)]
pub struct VoiceLog {
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    acquired: Arc<AtomicUsize>,
    release_delay_ms: Arc<AtomicU64>,
    position_ms: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl VoiceLog {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Most voices ever live at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Make dropping a voice take `by` before it counts as released.
    pub fn slow_release(&self, by: Duration) {
        self.release_delay_ms
            .store(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_ms.load(Ordering::SeqCst))
    }

    /// Pretend the current voice advanced to `position`.
    pub fn advance_to(&self, position: Duration) {
        self.position_ms
            .store(position.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make the current voice report that it ran out.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

/// Media whose bytes equal this marker fail to decode.
pub const CORRUPT: &[u8] = b"corrupt";

pub struct FakeOutput {
    log: VoiceLog,
    duration: Duration,
}

impl FakeOutput {
    pub fn new(log: VoiceLog) -> Self {
        Self {
            log,
            duration: Duration::from_secs(30),
        }
    }

    pub fn factory(log: VoiceLog) -> OutputFactory<FakeOutput> {
        Arc::new(move || Ok(FakeOutput::new(log.clone())))
    }
}

impl AudioOutput for FakeOutput {
    type Voice = FakeVoice;

    fn acquire(&mut self, media: &Media) -> Result<FakeVoice, EngineError> {
        if media.bytes().as_ref() == CORRUPT {
            return Err(EngineError::PrepareFailed {
                url: media.url().to_string(),
                reason: "undecodable".to_string(),
            });
        }
        let live = self.log.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.peak.fetch_max(live, Ordering::SeqCst);
        self.log.acquired.fetch_add(1, Ordering::SeqCst);
        self.log.position_ms.store(0, Ordering::SeqCst);
        self.log.playing.store(false, Ordering::SeqCst);
        self.log.finished.store(false, Ordering::SeqCst);
        Ok(FakeVoice {
            log: self.log.clone(),
            duration: self.duration,
        })
    }
}

pub struct FakeVoice {
    log: VoiceLog,
    duration: Duration,
}

impl Voice for FakeVoice {
    fn play(&mut self) {
        self.log.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&mut self) {
        self.log.playing.store(false, Ordering::SeqCst);
    }

    fn seek(&mut self, position: Duration) {
        self.log.advance_to(position.min(self.duration));
    }

    fn position(&self) -> Duration {
        self.log.position()
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.duration)
    }

    fn is_finished(&self) -> bool {
        self.log.finished.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.log.playing.store(false, Ordering::SeqCst);
    }
}

impl Drop for FakeVoice {
    fn drop(&mut self) {
        let delay = self.log.release_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay));
        }
        self.log.live.fetch_sub(1, Ordering::SeqCst);
        self.log.playing.store(false, Ordering::SeqCst);
    }
}

/// Serves fake bytes for any URL. URLs containing "missing" fail; URLs
/// containing "corrupt" load bytes that fail to decode.
#[derive(Default)]
pub struct FakeLoader {
    delays: Mutex<HashMap<String, Duration>>,
    loads: AtomicUsize,
}

impl FakeLoader {
    pub fn delay(&self, url: &str, by: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), by);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl MediaLoader for FakeLoader {
    fn load(&self, url: &str) -> Result<Media, EngineError> {
        let delay = self.delays.lock().unwrap().get(url).copied();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        if url.contains("missing") {
            return Err(EngineError::Load {
                url: url.to_string(),
                reason: "not found".to_string(),
            });
        }
        if url.contains("corrupt") {
            return Ok(Media::new(url, CORRUPT.to_vec()));
        }
        Ok(Media::new(url, b"audio".to_vec()))
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    tracks: Mutex<Vec<Track>>,
    delays: Mutex<HashMap<String, Duration>>,
    failure: Mutex<Option<CatalogError>>,
    lookups: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        let catalog = Self::default();
        *catalog.tracks.lock().unwrap() = tracks;
        catalog
    }

    /// Delay lookups of `id` (and searches for `id` as a query).
    pub fn delay(&self, id: &str, by: Duration) {
        self.delays.lock().unwrap().insert(id.to_string(), by);
    }

    pub fn fail_with(&self, e: CatalogError) {
        *self.failure.lock().unwrap() = Some(e);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn pause_for(&self, key: &str) {
        let delay = self.delays.lock().unwrap().get(key).copied();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
    }

    fn check(&self) -> Result<(), CatalogError> {
        match self.failure.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Catalog for FakeCatalog {
    fn top_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        self.check()?;
        Ok(self.tracks.lock().unwrap().clone())
    }

    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        self.pause_for(query);
        self.check()?;
        let needle = query.to_lowercase();
        let found: Vec<Track> = self
            .tracks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        if found.is_empty() {
            Err(CatalogError::NoResults)
        } else {
            Ok(found)
        }
    }

    fn track_by_id(&self, id: &str) -> Result<Track, CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.pause_for(id);
        self.check()?;
        self.tracks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(CatalogError::NoResults)
    }
}
