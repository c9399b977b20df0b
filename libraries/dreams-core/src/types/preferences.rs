/// User preference types
use serde::{Deserialize, Serialize};

/// Lowest playback speed
pub const MIN_PLAYBACK_SPEED: f32 = 0.5;

/// Highest playback speed
pub const MAX_PLAYBACK_SPEED: f32 = 2.0;

/// Shortest allowed fade-out, in seconds
pub const MIN_FADE_OUT_SECONDS: u32 = 5;

/// Shortest allowed default sleep timer, in minutes
pub const MIN_SLEEP_TIMER_MINUTES: u32 = 1;

/// User-tunable settings
///
/// Missing fields in a persisted blob take their default value, so older
/// blobs that only carried the audio fields still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    /// Dark UI theme
    #[serde(rename = "isDarkMode")]
    pub dark_mode: bool,

    /// Playback rate (0.5 - 2.0)
    pub playback_speed: f32,

    /// Output volume (0.0 - 1.0)
    pub volume: f32,

    /// Advance to the next queued story on completion
    pub autoplay_enabled: bool,

    /// Default sleep timer in minutes (>= 1)
    pub default_sleep_timer: u32,

    /// Restore the saved position when a story is loaded again
    pub remember_playback_position: bool,

    /// Offline mode
    pub offline_mode_enabled: bool,

    /// Keep playing while the app is in the background
    pub background_playback_enabled: bool,

    /// Fade out instead of pausing abruptly when the sleep timer fires
    pub fade_out_enabled: bool,

    /// Fade-out length in seconds (>= 5)
    pub fade_out_duration: u32,
}

impl UserPreferences {
    /// Copy with every field forced into its documented range
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            volume: clamp_volume(self.volume),
            playback_speed: clamp_speed(self.playback_speed),
            default_sleep_timer: self.default_sleep_timer.max(MIN_SLEEP_TIMER_MINUTES),
            fade_out_duration: self.fade_out_duration.max(MIN_FADE_OUT_SECONDS),
            ..self.clone()
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            playback_speed: 1.0,
            volume: 1.0,
            autoplay_enabled: false,
            default_sleep_timer: 30,
            remember_playback_position: true,
            offline_mode_enabled: false,
            background_playback_enabled: true,
            fade_out_enabled: true,
            fade_out_duration: 30,
        }
    }
}

/// Clamp a volume into [0, 1] (NaN becomes 0)
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Clamp a playback speed into [0.5, 2.0] (NaN becomes 1.0)
pub fn clamp_speed(speed: f32) -> f32 {
    if speed.is_nan() {
        1.0
    } else {
        speed.clamp(MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED)
    }
}
