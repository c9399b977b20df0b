//! User preferences management
//!
//! Preferences are loaded once at startup and then mutated through the
//! setters on [`PreferencesStore`]. Every setter validates its input, updates
//! the shared snapshot and persists the whole blob before returning.
//!
//! # Example
//!
//! ```rust
//! use dreams_storage::{MemoryStore, PreferencesStore};
//! use std::sync::Arc;
//!
//! # fn example() -> dreams_core::Result<()> {
//! let prefs = PreferencesStore::load_or_default(Arc::new(MemoryStore::new()));
//!
//! prefs.set_playback_speed(3.0)?; // clamped to 2.0
//! prefs.set_fade_out_duration(1)?; // floored to 5 seconds
//!
//! let current = prefs.get();
//! assert_eq!(current.playback_speed, 2.0);
//! assert_eq!(current.fade_out_duration, 5);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use dreams_core::types::{
    clamp_speed, clamp_volume, MIN_FADE_OUT_SECONDS, MIN_SLEEP_TIMER_MINUTES,
};
use dreams_core::{KeyValueStore, Result, UserPreferences};
use std::sync::{Arc, RwLock};

/// Key of the preferences blob
pub const PREFERENCES_KEY: &str = "com.historydreams.userpreferences";

/// Shared, persisted user preferences
///
/// Cheap to share behind an `Arc`. Writes are last-writer-wins; there is no
/// merging of concurrent edits.
pub struct PreferencesStore {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<UserPreferences>,
}

impl std::fmt::Debug for PreferencesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferencesStore")
            .field("current", &self.get())
            .finish_non_exhaustive()
    }
}

impl PreferencesStore {
    /// Load saved preferences, falling back to defaults
    ///
    /// Absent, unreadable or corrupt data yields [`UserPreferences::default`].
    /// Values outside their documented ranges are normalized.
    pub fn load_or_default(store: Arc<dyn KeyValueStore>) -> Self {
        let current = read_blob(store.as_ref()).unwrap_or_default().normalized();
        Self {
            store,
            current: RwLock::new(current),
        }
    }

    /// Snapshot of the current preferences
    pub fn get(&self) -> UserPreferences {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Replace every field at once (values are normalized)
    pub fn replace(&self, preferences: UserPreferences) -> Result<()> {
        self.update(|p| *p = preferences)
    }

    /// Restore factory defaults
    pub fn reset_to_defaults(&self) -> Result<()> {
        tracing::info!("Resetting preferences to defaults");
        self.update(|p| *p = UserPreferences::default())
    }

    // ===== Display =====

    /// Set dark mode
    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.update(|p| p.dark_mode = enabled)
    }

    /// Flip dark mode
    pub fn toggle_dark_mode(&self) -> Result<()> {
        self.update(|p| p.dark_mode = !p.dark_mode)
    }

    // ===== Playback =====

    /// Set playback speed, clamped to [0.5, 2.0]
    pub fn set_playback_speed(&self, speed: f32) -> Result<()> {
        self.update(|p| p.playback_speed = clamp_speed(speed))
    }

    /// Set volume, clamped to [0.0, 1.0]
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.update(|p| p.volume = clamp_volume(volume))
    }

    /// Set autoplay
    pub fn set_autoplay(&self, enabled: bool) -> Result<()> {
        self.update(|p| p.autoplay_enabled = enabled)
    }

    /// Flip autoplay
    pub fn toggle_autoplay(&self) -> Result<()> {
        self.update(|p| p.autoplay_enabled = !p.autoplay_enabled)
    }

    /// Set the default sleep timer, floored to one minute
    pub fn set_default_sleep_timer(&self, minutes: u32) -> Result<()> {
        self.update(|p| p.default_sleep_timer = minutes.max(MIN_SLEEP_TIMER_MINUTES))
    }

    /// Set whether positions are remembered between loads
    pub fn set_remember_playback_position(&self, enabled: bool) -> Result<()> {
        self.update(|p| p.remember_playback_position = enabled)
    }

    /// Flip position memory
    pub fn toggle_playback_position_memory(&self) -> Result<()> {
        self.update(|p| p.remember_playback_position = !p.remember_playback_position)
    }

    // ===== Fade =====

    /// Set fade-out on sleep timer expiry
    pub fn set_fade_out(&self, enabled: bool) -> Result<()> {
        self.update(|p| p.fade_out_enabled = enabled)
    }

    /// Flip fade-out
    pub fn toggle_fade_out(&self) -> Result<()> {
        self.update(|p| p.fade_out_enabled = !p.fade_out_enabled)
    }

    /// Set fade-out length, floored to five seconds
    pub fn set_fade_out_duration(&self, seconds: u32) -> Result<()> {
        self.update(|p| p.fade_out_duration = seconds.max(MIN_FADE_OUT_SECONDS))
    }

    // ===== Offline / background =====

    /// Set offline mode
    pub fn set_offline_mode(&self, enabled: bool) -> Result<()> {
        self.update(|p| p.offline_mode_enabled = enabled)
    }

    /// Flip offline mode
    pub fn toggle_offline_mode(&self) -> Result<()> {
        self.update(|p| p.offline_mode_enabled = !p.offline_mode_enabled)
    }

    /// Set background playback
    pub fn set_background_playback(&self, enabled: bool) -> Result<()> {
        self.update(|p| p.background_playback_enabled = enabled)
    }

    /// Flip background playback
    pub fn toggle_background_playback(&self) -> Result<()> {
        self.update(|p| p.background_playback_enabled = !p.background_playback_enabled)
    }

    /// Apply `mutate`, normalize, then persist the result
    ///
    /// The in-memory snapshot is updated even if persisting fails; the error
    /// is returned so the caller can surface it.
    ///
    /// The write lock is held until the blob is stored, so the persisted
    /// order of concurrent writes matches their in-memory order.
    fn update(&self, mutate: impl FnOnce(&mut UserPreferences)) -> Result<()> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        mutate(&mut current);
        *current = current.normalized();

        let raw = serde_json::to_string(&*current)?;
        self.store.set(PREFERENCES_KEY, &raw).map_err(|e| {
            tracing::warn!(error = %e, "Failed to persist preferences");
            e
        })
    }
}

fn read_blob(store: &dyn KeyValueStore) -> Option<UserPreferences> {
    let raw = match store.get(PREFERENCES_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read preferences, using defaults");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(prefs) => Some(prefs),
        Err(e) => {
            tracing::warn!(error = %e, "Corrupt preferences blob, using defaults");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn fresh() -> (Arc<MemoryStore>, PreferencesStore) {
        let backing = Arc::new(MemoryStore::new());
        let prefs = PreferencesStore::load_or_default(backing.clone());
        (backing, prefs)
    }

    #[test]
    fn empty_store_yields_defaults() {
        let (_, prefs) = fresh();
        assert_eq!(prefs.get(), UserPreferences::default());
    }

    #[test]
    fn corrupt_blob_yields_defaults() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(PREFERENCES_KEY, "[1, 2").unwrap();

        let prefs = PreferencesStore::load_or_default(backing);
        assert_eq!(prefs.get(), UserPreferences::default());
    }

    #[test]
    fn out_of_range_blob_is_normalized_on_load() {
        let backing = Arc::new(MemoryStore::new());
        backing
            .set(PREFERENCES_KEY, r#"{"volume": 7.0, "playbackSpeed": 9.0}"#)
            .unwrap();

        let prefs = PreferencesStore::load_or_default(backing).get();
        assert_eq!(prefs.volume, 1.0);
        assert_eq!(prefs.playback_speed, 2.0);
    }

    #[test]
    fn setters_clamp() {
        let (_, prefs) = fresh();

        prefs.set_volume(-1.0).unwrap();
        assert_eq!(prefs.get().volume, 0.0);

        prefs.set_playback_speed(0.25).unwrap();
        assert_eq!(prefs.get().playback_speed, 0.5);

        prefs.set_default_sleep_timer(0).unwrap();
        assert_eq!(prefs.get().default_sleep_timer, 1);

        prefs.set_fade_out_duration(3).unwrap();
        assert_eq!(prefs.get().fade_out_duration, 5);
    }

    #[test]
    fn every_setter_persists_immediately() {
        let (backing, prefs) = fresh();
        prefs.toggle_autoplay().unwrap();

        let raw = backing.get(PREFERENCES_KEY).unwrap().unwrap();
        let saved: UserPreferences = serde_json::from_str(&raw).unwrap();
        assert!(saved.autoplay_enabled);
    }

    #[test]
    fn toggles_flip() {
        let (_, prefs) = fresh();
        let before = prefs.get();

        prefs.toggle_dark_mode().unwrap();
        prefs.toggle_fade_out().unwrap();
        prefs.toggle_offline_mode().unwrap();
        prefs.toggle_background_playback().unwrap();
        prefs.toggle_playback_position_memory().unwrap();

        let after = prefs.get();
        assert_eq!(after.dark_mode, !before.dark_mode);
        assert_eq!(after.fade_out_enabled, !before.fade_out_enabled);
        assert_eq!(after.offline_mode_enabled, !before.offline_mode_enabled);
        assert_eq!(
            after.background_playback_enabled,
            !before.background_playback_enabled
        );
        assert_eq!(
            after.remember_playback_position,
            !before.remember_playback_position
        );
    }

    #[test]
    fn reset_restores_defaults() {
        let (_, prefs) = fresh();
        prefs.set_volume(0.2).unwrap();
        prefs.set_autoplay(true).unwrap();

        prefs.reset_to_defaults().unwrap();
        assert_eq!(prefs.get(), UserPreferences::default());
    }
}
