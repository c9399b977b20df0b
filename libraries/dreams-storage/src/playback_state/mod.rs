//! Playback state persistence
//!
//! The whole snapshot lives in one JSON blob. Reads never fail: an absent or
//! undecodable blob yields [`PlaybackState::initial`].

use dreams_core::{KeyValueStore, PlaybackState, Result};

/// Key of the playback-state blob
pub const PLAYBACK_STATE_KEY: &str = "com.historydreams.playbackstate";

/// Load the saved snapshot, or the initial state
pub fn load(store: &dyn KeyValueStore) -> PlaybackState {
    let raw = match store.get(PLAYBACK_STATE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return PlaybackState::initial(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read playback state, using initial state");
            return PlaybackState::initial();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Corrupt playback state blob, using initial state");
        PlaybackState::initial()
    })
}

/// Persist a snapshot, replacing the previous one
pub fn save(store: &dyn KeyValueStore, state: &PlaybackState) -> Result<()> {
    let raw = serde_json::to_string(state)?;
    store.set(PLAYBACK_STATE_KEY, &raw)
}

/// Forget the saved snapshot
pub fn clear(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(PLAYBACK_STATE_KEY)
}
