mod ids;
mod playback_state;
mod preferences;
mod story;

pub use ids::StoryId;
pub use playback_state::PlaybackState;
pub use preferences::{
    clamp_speed, clamp_volume, UserPreferences, MAX_PLAYBACK_SPEED, MIN_FADE_OUT_SECONDS,
    MIN_PLAYBACK_SPEED, MIN_SLEEP_TIMER_MINUTES,
};
pub use story::{clamp_progress, Category, Story};
