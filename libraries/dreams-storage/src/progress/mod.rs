//! Per-story progress persistence
//!
//! One fraction in [0, 1] per story, stored under `story_progress_<ID>`.

use dreams_core::types::clamp_progress;
use dreams_core::{KeyValueStore, Result, StoryId};

/// Prefix of every progress key
pub const PROGRESS_KEY_PREFIX: &str = "story_progress_";

/// Key holding the progress of `story_id`
pub fn key_for(story_id: &StoryId) -> String {
    format!("{PROGRESS_KEY_PREFIX}{story_id}")
}

/// Saved progress for a story (0.0 when nothing usable is stored)
pub fn load(store: &dyn KeyValueStore, story_id: &StoryId) -> f64 {
    let key = key_for(story_id);
    match store.get(&key) {
        Ok(Some(raw)) => match raw.trim().parse::<f64>() {
            Ok(value) => clamp_progress(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Corrupt progress value, treating as 0");
                0.0
            }
        },
        Ok(None) => 0.0,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to read progress, treating as 0");
            0.0
        }
    }
}

/// Persist the progress of a story (clamped to [0, 1])
pub fn save(store: &dyn KeyValueStore, story_id: &StoryId, progress: f64) -> Result<()> {
    let value = serde_json::to_string(&clamp_progress(progress))?;
    store.set(&key_for(story_id), &value)
}

/// Forget the progress of a story
pub fn clear(store: &dyn KeyValueStore, story_id: &StoryId) -> Result<()> {
    store.remove(&key_for(story_id))
}
