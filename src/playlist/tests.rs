use crate::testing::{MemoryStore, ids, track, tracks};

use super::*;

fn registry() -> PlaylistRegistry {
    PlaylistRegistry::load(Box::new(MemoryStore::default()))
}

#[test]
fn next_and_previous_walk_the_active_list() {
    let reg = registry();
    reg.set_list(ListTag::Top, tracks(&["t1", "t2", "t3"]));
    reg.set_current_track("t2");

    assert_eq!(reg.next_track().map(|t| t.id), Some("t3".to_string()));
    assert_eq!(reg.previous_track().map(|t| t.id), Some("t1".to_string()));

    reg.set_current_track("t3");
    assert_eq!(reg.next_track(), None);
}

#[test]
fn previous_of_first_is_none() {
    let reg = registry();
    reg.set_list(ListTag::Top, tracks(&["t1", "t2"]));
    reg.set_current_track("t1");
    assert_eq!(reg.previous_track(), None);
}

#[test]
fn next_without_current_track_starts_at_the_first() {
    let reg = registry();
    reg.set_list(ListTag::Search, tracks(&["s1", "s2"]));
    assert_eq!(reg.next_track().map(|t| t.id), Some("s1".to_string()));
    assert_eq!(reg.previous_track(), None);
}

#[test]
fn unknown_current_id_yields_none() {
    let reg = registry();
    reg.set_list(ListTag::Top, tracks(&["t1", "t2"]));
    reg.set_current_track("gone");
    assert_eq!(reg.next_track(), None);
    assert_eq!(reg.previous_track(), None);
}

#[test]
fn empty_active_list_yields_none() {
    let reg = registry();
    reg.set_list(ListTag::Search, Vec::new());
    assert_eq!(reg.next_track(), None);
    reg.set_current_track("x");
    assert_eq!(reg.next_track(), None);
    assert_eq!(reg.previous_track(), None);
}

#[test]
fn blank_current_track_is_ignored() {
    let reg = registry();
    reg.set_current_track("a");
    reg.set_current_track("");
    reg.set_current_track("   ");
    assert_eq!(reg.current_track_id().as_deref(), Some("a"));
}

#[test]
fn set_list_switches_the_active_tag() {
    let reg = registry();
    assert_eq!(reg.current_tag(), ListTag::Downloaded);

    reg.set_list(ListTag::Search, tracks(&["s1"]));
    assert_eq!(reg.current_tag(), ListTag::Search);

    let snapshot = reg.snapshot();
    assert_eq!(snapshot.tag, ListTag::Search);
    assert_eq!(ids(&snapshot.tracks), vec!["s1"]);

    // Other lists are kept while inactive.
    reg.set_list(ListTag::Top, tracks(&["t1"]));
    assert_eq!(ids(&reg.list(ListTag::Search)), vec!["s1"]);
}

#[test]
fn add_track_skips_duplicates_and_makes_downloads_current() {
    let reg = registry();
    reg.set_list(ListTag::Downloaded, tracks(&["d1"]));
    reg.set_list(ListTag::Top, tracks(&["t1"]));

    assert!(!reg.add_track(track("d1")));
    assert_eq!(reg.current_tag(), ListTag::Downloaded);
    assert_eq!(ids(&reg.list(ListTag::Downloaded)), vec!["d1"]);

    assert!(reg.add_track(track("d2")));
    assert_eq!(ids(&reg.list(ListTag::Downloaded)), vec!["d1", "d2"]);
    assert!(reg.is_track_downloaded("d2"));
    assert!(!reg.is_track_downloaded("t1"));
}

#[test]
fn downloaded_list_never_holds_duplicate_ids() {
    let reg = registry();
    reg.set_list(ListTag::Downloaded, tracks(&["a", "b", "a", "c", "b"]));
    for id in ["c", "d", "a", "d", "e"] {
        reg.add_track(track(id));
    }

    let list = reg.list(ListTag::Downloaded);
    assert_eq!(ids(&list), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn set_list_does_not_dedupe_non_download_lists() {
    let reg = registry();
    reg.set_list(ListTag::Search, tracks(&["a", "a"]));
    assert_eq!(reg.list(ListTag::Search).len(), 2);
}

#[test]
fn downloads_survive_a_reload() {
    let store = MemoryStore::default();
    {
        let reg = PlaylistRegistry::load(Box::new(store.clone()));
        reg.add_track(track("d1").with_preview("/music/d1.mp3"));
        reg.add_track(track("d2").with_preview("/music/d2.mp3"));
    }
    assert!(store.raw(DOWNLOADED_KEY).is_some());

    let reloaded = PlaylistRegistry::load(Box::new(store));
    let list = reloaded.list(ListTag::Downloaded);
    assert_eq!(ids(&list), vec!["d1", "d2"]);
    assert_eq!(list[0].preview, "/music/d1.mp3");
    assert_eq!(reloaded.current_tag(), ListTag::Downloaded);
}

#[test]
fn corrupt_persisted_data_loads_as_empty() {
    let store = MemoryStore::with(DOWNLOADED_KEY, "{ not json");
    let reg = PlaylistRegistry::load(Box::new(store));
    assert!(reg.list(ListTag::Downloaded).is_empty());
}

#[test]
fn persisted_duplicates_are_dropped_on_load() {
    let json = serde_json::to_string(&tracks(&["a", "a", "b"])).unwrap();
    let reg = PlaylistRegistry::load(Box::new(MemoryStore::with(DOWNLOADED_KEY, &json)));
    assert_eq!(ids(&reg.list(ListTag::Downloaded)), vec!["a", "b"]);
}

#[test]
fn filter_downloaded_matches_titles_case_insensitively() {
    let reg = registry();
    let mut a = track("a");
    a.title = "Blue Monday".to_string();
    let mut b = track("b");
    b.title = "Red Rain".to_string();
    reg.set_list(ListTag::Downloaded, vec![a, b]);

    reg.filter_downloaded("bLuE");
    assert_eq!(reg.current_tag(), ListTag::FilteredDownloaded);
    assert_eq!(ids(&reg.list(ListTag::FilteredDownloaded)), vec!["a"]);

    reg.filter_downloaded("  ");
    assert_eq!(ids(&reg.list(ListTag::FilteredDownloaded)), vec!["a", "b"]);

    reg.filter_downloaded("green");
    assert!(reg.list(ListTag::FilteredDownloaded).is_empty());
    // The source list is untouched.
    assert_eq!(reg.list(ListTag::Downloaded).len(), 2);
}

#[test]
fn file_store_round_trips_and_reports_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested"));

    assert_eq!(store.get("absent").unwrap(), None);
    store.set("slot", "[1,2]").unwrap();
    assert_eq!(store.get("slot").unwrap().as_deref(), Some("[1,2]"));
    store.set("slot", "[]").unwrap();
    assert_eq!(store.get("slot").unwrap().as_deref(), Some("[]"));
    assert!(dir.path().join("nested").join("slot.json").exists());
}

#[test]
fn registry_over_file_store_persists_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let reg = PlaylistRegistry::load(Box::new(FileStore::new(dir.path())));
    reg.add_track(track("d1"));
    drop(reg);

    let reg = PlaylistRegistry::load(Box::new(FileStore::new(dir.path())));
    assert!(reg.is_track_downloaded("d1"));
}

#[test]
fn concurrent_readers_see_whole_lists() {
    use std::sync::Arc;
    use std::thread;

    let reg = Arc::new(registry());
    reg.set_list(ListTag::Top, tracks(&["a", "b"]));

    let writer = {
        let reg = Arc::clone(&reg);
        thread::spawn(move || {
            for _ in 0..200 {
                reg.set_list(ListTag::Top, tracks(&["a", "b"]));
                reg.set_list(ListTag::Top, tracks(&["x", "y", "z"]));
            }
        })
    };
    for _ in 0..200 {
        let len = reg.list(ListTag::Top).len();
        assert!(len == 2 || len == 3);
    }
    writer.join().unwrap();
}

#[test]
fn activate_switches_tag_without_touching_lists() {
    let reg = registry();
    reg.set_list(ListTag::Downloaded, tracks(&["d1"]));
    reg.set_list(ListTag::Top, tracks(&["t1", "t2"]));
    reg.set_current_track("d1");

    reg.activate(ListTag::Downloaded);

    assert_eq!(reg.current_tag(), ListTag::Downloaded);
    assert_eq!(reg.list(ListTag::Top).len(), 2);
    assert_eq!(reg.next_track(), None);
}

#[test]
fn snapshot_locates_the_current_track() {
    let reg = registry();
    reg.set_list(ListTag::Top, tracks(&["t1", "t2"]));
    assert_eq!(reg.snapshot().current_position(), None);

    reg.set_current_track("t2");
    assert_eq!(reg.snapshot().current_position(), Some(1));

    reg.set_current_track("elsewhere");
    assert_eq!(reg.snapshot().current_position(), None);
}
