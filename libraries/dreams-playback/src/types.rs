//! Core types for session management

use crate::error::PlaybackError;
use dreams_core::{PlaybackState, Story};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of the loaded story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No player
    Unloaded,

    /// Player created, waiting for the media to report its duration
    Loading,

    /// Duration known, never started
    Ready,

    /// Transport running
    Playing,

    /// Paused mid-story
    Paused,

    /// Reached the end of the media
    Completed,
}

impl SessionStatus {
    /// Whether a player exists for the current story
    pub fn has_player(self) -> bool {
        !matches!(self, Self::Unloaded)
    }
}

/// What the sleep timer does when it runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryAction {
    /// Pause immediately
    Pause,

    /// Ramp the volume down over the preferred fade duration, then pause
    FadeOut,
}

/// Identifies one player instance
///
/// Every load hands out a new token; media notifications carrying an older
/// token belong to a torn-down player and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Token following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Timing configuration for a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// How often playback progress is sampled (default: 500ms)
    pub progress_interval: Duration,

    /// Minimum playback time between progress writes (default: 1s)
    pub persist_interval: Duration,

    /// Sleep-timer countdown resolution (default: 1s)
    pub timer_interval: Duration,

    /// Number of volume steps in a fade-out (default: 50)
    pub fade_steps: u32,

    /// Longest accepted fade-out (default: 10 minutes)
    pub max_fade_duration: Duration,

    /// How long a load may wait for the media duration (default: 30s)
    pub ready_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(500),
            persist_interval: Duration::from_secs(1),
            timer_interval: Duration::from_secs(1),
            fade_steps: 50,
            max_fade_duration: Duration::from_secs(10 * 60),
            ready_timeout: Duration::from_secs(30),
        }
    }
}

/// Everything an observer needs to render the session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Persisted playback snapshot
    pub state: PlaybackState,

    /// Lifecycle stage
    pub status: SessionStatus,

    /// Loaded story, with its resolved duration and progress
    pub story: Option<Story>,

    /// Current player volume
    pub volume: f32,

    /// Whether a fade-out is in flight
    pub is_fading: bool,

    /// Stories waiting in the up-next queue
    pub up_next: usize,

    /// Last failure, if not cleared
    pub error: Option<PlaybackError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.progress_interval, Duration::from_millis(500));
        assert_eq!(config.persist_interval, Duration::from_secs(1));
        assert_eq!(config.timer_interval, Duration::from_secs(1));
        assert_eq!(config.fade_steps, 50);
        assert_eq!(config.ready_timeout, Duration::from_secs(30));
    }

    #[test]
    fn tokens_increase() {
        let first = LoadToken::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), first.value() + 1);
    }

    #[test]
    fn only_unloaded_has_no_player() {
        assert!(!SessionStatus::Unloaded.has_player());
        for status in [
            SessionStatus::Loading,
            SessionStatus::Ready,
            SessionStatus::Playing,
            SessionStatus::Paused,
            SessionStatus::Completed,
        ] {
            assert!(status.has_player());
        }
    }
}
