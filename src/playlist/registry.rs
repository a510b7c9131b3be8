use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::catalog::Track;
use crate::error::StoreError;

use super::store::KeyValueStore;

/// Store slot holding the serialized downloaded list.
pub const DOWNLOADED_KEY: &str = "downloaded_tracks";

/// Which of the four lists a tracklist belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ListTag {
    Search,
    Top,
    Downloaded,
    FilteredDownloaded,
}

impl ListTag {
    fn index(self) -> usize {
        match self {
            Self::Search => 0,
            Self::Top => 1,
            Self::Downloaded => 2,
            Self::FilteredDownloaded => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Top => "top tracks",
            Self::Downloaded => "downloads",
            Self::FilteredDownloaded => "filtered downloads",
        }
    }
}

/// Immutable view of the active list at one instant.
#[derive(Debug, Clone)]
pub struct PlaylistSnapshot {
    pub tag: ListTag,
    pub tracks: Arc<[Track]>,
    pub current_track_id: Option<String>,
}

impl PlaylistSnapshot {
    /// Index of the current track within this list, if it is in it.
    pub fn current_position(&self) -> Option<usize> {
        let id = self.current_track_id.as_deref()?;
        self.tracks.iter().position(|t| t.id == id)
    }
}

#[derive(Clone)]
struct State {
    lists: [Arc<[Track]>; 4],
    current_tag: ListTag,
    current_track_id: Option<String>,
}

impl State {
    fn active(&self) -> &[Track] {
        &self.lists[self.current_tag.index()]
    }
}

/// Process-wide playlist state.
///
/// Lookups never fail: anything out of range or unknown yields `None`.
/// Writes replace whole lists, so readers always observe a complete list.
pub struct PlaylistRegistry {
    state: RwLock<State>,
    store: Box<dyn KeyValueStore>,
}

impl PlaylistRegistry {
    /// Build the registry from the persisted downloaded list. Unreadable or
    /// corrupt data yields an empty list. The downloaded list starts current.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let downloaded = match store.get(DOWNLOADED_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Track>>(&json) {
                Ok(tracks) => dedup_by_id(tracks),
                Err(e) => {
                    warn!(error = %e, "persisted downloads are corrupt; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read persisted downloads; starting empty");
                Vec::new()
            }
        };
        debug!(count = downloaded.len(), "loaded downloaded tracks");

        let empty: Arc<[Track]> = Arc::from(Vec::new());
        Self {
            state: RwLock::new(State {
                lists: [
                    empty.clone(),
                    empty.clone(),
                    Arc::from(downloaded),
                    empty,
                ],
                current_tag: ListTag::Downloaded,
                current_track_id: None,
            }),
            store,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Replace `tag`'s list wholesale and make it current. Setting the
    /// downloaded list deduplicates it and persists it.
    pub fn set_list(&self, tag: ListTag, tracks: Vec<Track>) {
        let mut state = self.write();
        let tracks = if tag == ListTag::Downloaded {
            let tracks = dedup_by_id(tracks);
            self.persist(&tracks);
            tracks
        } else {
            tracks
        };
        debug!(list = tag.label(), count = tracks.len(), "list replaced");
        state.lists[tag.index()] = Arc::from(tracks);
        state.current_tag = tag;
    }

    /// Make `tag`'s existing list current without replacing it.
    pub fn activate(&self, tag: ListTag) {
        self.write().current_tag = tag;
    }

    /// Point at the track the user opened. Blank ids are ignored.
    pub fn set_current_track(&self, track_id: &str) {
        if track_id.trim().is_empty() {
            return;
        }
        self.write().current_track_id = Some(track_id.to_string());
    }

    pub fn current_track_id(&self) -> Option<String> {
        self.read().current_track_id.clone()
    }

    pub fn current_tag(&self) -> ListTag {
        self.read().current_tag
    }

    pub fn list(&self, tag: ListTag) -> Arc<[Track]> {
        Arc::clone(&self.read().lists[tag.index()])
    }

    pub fn snapshot(&self) -> PlaylistSnapshot {
        let state = self.read();
        PlaylistSnapshot {
            tag: state.current_tag,
            tracks: Arc::clone(&state.lists[state.current_tag.index()]),
            current_track_id: state.current_track_id.clone(),
        }
    }

    /// Track after the current one in the active list.
    ///
    /// With no current track this is the first track, so "next" can start
    /// playback. Unknown current ids and the list end yield `None`.
    pub fn next_track(&self) -> Option<Track> {
        let state = self.read();
        let list = state.active();
        let Some(id) = state.current_track_id.as_deref() else {
            return list.first().cloned();
        };
        let pos = list.iter().position(|t| t.id == id)?;
        list.get(pos + 1).cloned()
    }

    /// Track before the current one in the active list. With no current
    /// track there is no previous one.
    pub fn previous_track(&self) -> Option<Track> {
        let state = self.read();
        let list = state.active();
        let id = state.current_track_id.as_deref()?;
        let pos = list.iter().position(|t| t.id == id)?;
        pos.checked_sub(1).and_then(|p| list.get(p).cloned())
    }

    /// Append a downloaded copy unless one with the same id exists.
    /// Returns whether the list changed. Either way downloads become current.
    pub fn add_track(&self, track: Track) -> bool {
        let mut state = self.write();
        let idx = ListTag::Downloaded.index();
        state.current_tag = ListTag::Downloaded;
        if state.lists[idx].iter().any(|t| t.id == track.id) {
            debug!(id = %track.id, "track already downloaded");
            return false;
        }
        let mut updated = state.lists[idx].to_vec();
        updated.push(track);
        self.persist(&updated);
        state.lists[idx] = Arc::from(updated);
        true
    }

    pub fn is_track_downloaded(&self, track_id: &str) -> bool {
        self.downloaded_track(track_id).is_some()
    }

    pub fn downloaded_track(&self, track_id: &str) -> Option<Track> {
        self.read().lists[ListTag::Downloaded.index()]
            .iter()
            .find(|t| t.id == track_id)
            .cloned()
    }

    /// Set the filtered list to downloads whose title contains `query`
    /// (case-insensitive; blank matches all) and make it current.
    pub fn filter_downloaded(&self, query: &str) {
        let query = query.trim().to_lowercase();
        let filtered: Vec<Track> = self
            .list(ListTag::Downloaded)
            .iter()
            .filter(|t| query.is_empty() || t.title.to_lowercase().contains(&query))
            .cloned()
            .collect();
        self.set_list(ListTag::FilteredDownloaded, filtered);
    }

    fn persist(&self, tracks: &[Track]) {
        let result = serde_json::to_string_pretty(tracks)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(DOWNLOADED_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "failed to persist downloaded tracks");
        }
    }
}

fn dedup_by_id(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = std::collections::HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}
