use chrono::{Duration, Utc};
use dreams_core::{KeyValueStore, PlaybackState, StoryId, UserPreferences};
use dreams_storage::preferences::PREFERENCES_KEY;
use dreams_storage::{playback_state, progress, FileStore, MemoryStore, PreferencesStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration as StdDuration;
use tempfile::TempDir;

#[test]
fn test_playback_state_round_trip() {
    let store = MemoryStore::new();
    let state = PlaybackState::initial()
        .with_story(Some(StoryId::generate()))
        .with_time(642.25)
        .with_playing(true)
        .with_timer_end(Some(Utc::now() + Duration::minutes(15)));

    playback_state::save(&store, &state).unwrap();
    assert_eq!(playback_state::load(&store), state);
}

#[test]
fn test_preferences_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("defaults.json");

    let expected = {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
        let prefs = PreferencesStore::load_or_default(store);
        prefs.set_volume(0.35).unwrap();
        prefs.set_playback_speed(1.5).unwrap();
        prefs.set_default_sleep_timer(45).unwrap();
        prefs.toggle_dark_mode().unwrap();
        prefs.get()
    };

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
    let reloaded = PreferencesStore::load_or_default(store).get();
    assert_eq!(reloaded, expected);
    assert_ne!(reloaded, UserPreferences::default());
}

#[test]
fn test_preferences_last_writer_wins() {
    let backing = Arc::new(MemoryStore::new());
    let editor = PreferencesStore::load_or_default(backing.clone());
    let other = PreferencesStore::load_or_default(backing.clone());

    editor.set_volume(0.1).unwrap();
    other.set_autoplay(true).unwrap();

    // `other` never saw the volume change, so its blob wins wholesale
    let reloaded = PreferencesStore::load_or_default(backing).get();
    assert!(reloaded.autoplay_enabled);
    assert_eq!(reloaded.volume, 1.0);
}

/// Store whose first write stalls after announcing itself
struct SlowFirstWrite {
    inner: MemoryStore,
    writes: AtomicUsize,
    entered: Mutex<mpsc::Sender<()>>,
}

impl KeyValueStore for SlowFirstWrite {
    fn get(&self, key: &str) -> dreams_core::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> dreams_core::Result<()> {
        if self.writes.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = self.entered.lock().unwrap().send(());
            thread::sleep(StdDuration::from_millis(100));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> dreams_core::Result<()> {
        self.inner.remove(key)
    }
}

#[test]
fn test_concurrent_setters_persist_in_memory_order() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let backing = Arc::new(SlowFirstWrite {
        inner: MemoryStore::new(),
        writes: AtomicUsize::new(0),
        entered: Mutex::new(entered_tx),
    });
    let prefs = PreferencesStore::load_or_default(backing.clone());

    thread::scope(|scope| {
        scope.spawn(|| prefs.set_volume(0.2).unwrap());
        entered_rx.recv().unwrap();
        prefs.set_autoplay(true).unwrap();
    });

    let in_memory = prefs.get();
    let raw = backing.get(PREFERENCES_KEY).unwrap().unwrap();
    let on_disk: UserPreferences = serde_json::from_str(&raw).unwrap();

    assert_eq!(on_disk, in_memory);
    assert!(on_disk.autoplay_enabled);
    assert_eq!(on_disk.volume, 0.2);
}

#[test]
fn test_progress_is_per_story() {
    let store = MemoryStore::new();
    let first = StoryId::generate();
    let second = StoryId::generate();

    progress::save(&store, &first, 0.25).unwrap();
    progress::save(&store, &second, 0.75).unwrap();

    assert_eq!(progress::load(&store, &first), 0.25);
    assert_eq!(progress::load(&store, &second), 0.75);
}
