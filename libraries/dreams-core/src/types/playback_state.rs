/// Playback state snapshot
use crate::types::StoryId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of what is playing
///
/// A new snapshot is produced for every state-changing event; the `with_*`
/// builders never mutate the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Story currently loaded (if any)
    #[serde(default, rename = "currentStoryID")]
    pub current_story_id: Option<StoryId>,

    /// Playback position in seconds
    #[serde(default, rename = "currentTime")]
    pub current_time: f64,

    /// Whether the transport is running
    #[serde(default, rename = "isPlaying")]
    pub is_playing: bool,

    /// When the sleep timer fires (if one is set)
    #[serde(default, rename = "sleepTimerEndTime")]
    pub sleep_timer_end: Option<DateTime<Utc>>,
}

impl PlaybackState {
    /// Nothing loaded, nothing playing, no timer
    pub fn initial() -> Self {
        Self {
            current_story_id: None,
            current_time: 0.0,
            is_playing: false,
            sleep_timer_end: None,
        }
    }

    /// Timer set and still in the future
    pub fn has_active_timer(&self, now: DateTime<Utc>) -> bool {
        self.sleep_timer_end.is_some_and(|end| end > now)
    }

    /// Time left on the sleep timer
    ///
    /// `None` when no timer is set. Negative once the end time has passed
    /// but the timer has not been cleared yet.
    pub fn remaining_timer_duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.sleep_timer_end.map(|end| end - now)
    }

    /// Copy with a different story
    #[must_use]
    pub fn with_story(&self, story_id: Option<StoryId>) -> Self {
        Self {
            current_story_id: story_id,
            ..self.clone()
        }
    }

    /// Copy with a different position (negative and NaN become 0)
    #[must_use]
    pub fn with_time(&self, seconds: f64) -> Self {
        let current_time = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };
        Self {
            current_time,
            ..self.clone()
        }
    }

    /// Copy with a different transport flag
    #[must_use]
    pub fn with_playing(&self, is_playing: bool) -> Self {
        Self {
            is_playing,
            ..self.clone()
        }
    }

    /// Copy with a different timer end
    #[must_use]
    pub fn with_timer_end(&self, end: Option<DateTime<Utc>>) -> Self {
        Self {
            sleep_timer_end: end,
            ..self.clone()
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let state = PlaybackState::initial();
        assert_eq!(state.current_story_id, None);
        assert_eq!(state.current_time, 0.0);
        assert!(!state.is_playing);
        assert!(state.sleep_timer_end.is_none());
    }

    #[test]
    fn timer_activity_depends_on_now() {
        let now = Utc::now();
        let state = PlaybackState::initial().with_timer_end(Some(now + Duration::seconds(10)));

        assert!(state.has_active_timer(now));
        assert_eq!(state.remaining_timer_duration(now), Some(Duration::seconds(10)));

        let later = now + Duration::seconds(10);
        assert!(!state.has_active_timer(later));
        assert_eq!(state.remaining_timer_duration(later), Some(Duration::zero()));

        let much_later = now + Duration::seconds(15);
        assert_eq!(
            state.remaining_timer_duration(much_later),
            Some(Duration::seconds(-5))
        );
    }

    #[test]
    fn no_timer_means_no_remaining_duration() {
        let now = Utc::now();
        let state = PlaybackState::initial();
        assert!(!state.has_active_timer(now));
        assert_eq!(state.remaining_timer_duration(now), None);
    }

    #[test]
    fn builders_leave_original_untouched() {
        let original = PlaybackState::initial();
        let playing = original.with_playing(true).with_time(42.0);

        assert!(!original.is_playing);
        assert_eq!(original.current_time, 0.0);
        assert!(playing.is_playing);
        assert_eq!(playing.current_time, 42.0);
    }

    #[test]
    fn with_time_rejects_negative_and_nan() {
        let state = PlaybackState::initial();
        assert_eq!(state.with_time(-3.0).current_time, 0.0);
        assert_eq!(state.with_time(f64::NAN).current_time, 0.0);
    }

    #[test]
    fn json_keys_match_persisted_contract() {
        let id = StoryId::generate();
        let state = PlaybackState::initial()
            .with_story(Some(id.clone()))
            .with_time(12.5)
            .with_playing(true);
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["currentStoryID"], id.to_string());
        assert_eq!(value["currentTime"], 12.5);
        assert_eq!(value["isPlaying"], true);
        assert!(value["sleepTimerEndTime"].is_null());
    }
}
