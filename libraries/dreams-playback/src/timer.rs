//! Sleep timer presets and the timer facade
//!
//! There is only one sleep timer, owned by the session. [`TimerController`]
//! keeps the listener's preset selection and drives that timer through the
//! [`SleepTimerHost`] trait, so it works the same against a
//! [`crate::SessionController`] or a [`crate::SessionHandle`].

use crate::error::Result;
use crate::types::ExpiryAction;
use dreams_storage::PreferencesStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Owner of the sleep timer
pub trait SleepTimerHost {
    /// Start the timer, replacing any running one
    fn start_sleep_timer_with(&mut self, duration: Duration, action: ExpiryAction) -> Result<()>;

    /// Clear the timer
    fn cancel_sleep_timer(&mut self) -> Result<()>;

    /// Time left, `None` when no timer is running
    fn sleep_timer_remaining(&self) -> Option<Duration>;
}

/// Selectable sleep timer length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerPreset {
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    FortyFiveMinutes,
    OneHour,
    NinetyMinutes,
}

impl TimerPreset {
    /// Every preset, shortest first
    pub const ALL: [TimerPreset; 6] = [
        TimerPreset::FiveMinutes,
        TimerPreset::FifteenMinutes,
        TimerPreset::ThirtyMinutes,
        TimerPreset::FortyFiveMinutes,
        TimerPreset::OneHour,
        TimerPreset::NinetyMinutes,
    ];

    /// Length in minutes
    pub fn minutes(self) -> u32 {
        match self {
            Self::FiveMinutes => 5,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
            Self::FortyFiveMinutes => 45,
            Self::OneHour => 60,
            Self::NinetyMinutes => 90,
        }
    }

    /// Length as a duration
    pub fn duration(self) -> Duration {
        Duration::from_secs(u64::from(self.minutes()) * 60)
    }

    /// Label for a picker
    pub fn label(self) -> String {
        format!("{} min", self.minutes())
    }

    /// Preset closest to `minutes`; ties go to the shorter preset
    pub fn nearest(minutes: u32) -> Self {
        let mut best = Self::FiveMinutes;
        for preset in Self::ALL {
            if preset.minutes().abs_diff(minutes) < best.minutes().abs_diff(minutes) {
                best = preset;
            }
        }
        best
    }
}

/// Sleep timer screen logic
///
/// Whether expiry fades out is the `fade_out_enabled` preference, so the
/// choice made here also applies to timers started elsewhere.
#[derive(Debug)]
pub struct TimerController {
    preferences: Arc<PreferencesStore>,
    selected: TimerPreset,
}

impl TimerController {
    /// Create a controller selecting the preset nearest to the preferred
    /// default length
    pub fn new(preferences: Arc<PreferencesStore>) -> Self {
        let selected = TimerPreset::nearest(preferences.get().default_sleep_timer);
        Self {
            preferences,
            selected,
        }
    }

    /// Selected preset
    pub fn selected(&self) -> TimerPreset {
        self.selected
    }

    /// Change the preset, restarting a running timer with the new length
    pub fn select<H: SleepTimerHost + ?Sized>(
        &mut self,
        preset: TimerPreset,
        host: &mut H,
    ) -> Result<()> {
        self.selected = preset;
        if self.is_active(host) {
            self.start(host)?;
        }
        Ok(())
    }

    /// Start the timer with the selected preset
    pub fn start<H: SleepTimerHost + ?Sized>(&self, host: &mut H) -> Result<()> {
        host.start_sleep_timer_with(self.selected.duration(), self.expiry_action())
    }

    /// Stop the timer
    pub fn stop<H: SleepTimerHost + ?Sized>(&self, host: &mut H) -> Result<()> {
        host.cancel_sleep_timer()
    }

    /// Whole seconds left, 0 when no timer is running
    pub fn remaining<H: SleepTimerHost + ?Sized>(&self, host: &H) -> u64 {
        host.sleep_timer_remaining().map_or(0, |left| left.as_secs())
    }

    /// Whether a timer is running
    pub fn is_active<H: SleepTimerHost + ?Sized>(&self, host: &H) -> bool {
        host.sleep_timer_remaining().is_some()
    }

    /// Whether expiry fades out
    pub fn fade_out_enabled(&self) -> bool {
        self.preferences.get().fade_out_enabled
    }

    /// Choose between fading out and pausing at expiry
    ///
    /// Takes effect the next time the timer starts.
    pub fn set_fade_out(&self, enabled: bool) -> Result<()> {
        self.preferences.set_fade_out(enabled)?;
        Ok(())
    }

    fn expiry_action(&self) -> ExpiryAction {
        if self.fade_out_enabled() {
            ExpiryAction::FadeOut
        } else {
            ExpiryAction::Pause
        }
    }
}

/// Format seconds as `M:SS`
///
/// ```
/// use dreams_playback::format_time;
///
/// assert_eq!(format_time(0), "0:00");
/// assert_eq!(format_time(905), "15:05");
/// assert_eq!(format_time(5400), "90:00");
/// ```
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
