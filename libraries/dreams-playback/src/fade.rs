//! Fade-out ramp for the sleep timer
//!
//! A linear volume ramp split into a fixed number of discrete steps:
//! - Step `k` of `n` sets the volume to `original * (n - k) / n`
//! - Steps are spaced `duration / n` apart, the first one `duration / n`
//!   after the fade starts
//! - The last step lands exactly on 0.0
//!
//! The ramp only computes volumes and deadlines. The session applies them to
//! the player, pauses after the last step and restores the original volume.

use chrono::{DateTime, Duration, Utc};

/// Outcome of one fade step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    /// Apply this volume; more steps follow
    Volume(f32),

    /// Final step: volume reached 0.0
    Finished,
}

/// In-flight fade-out
#[derive(Debug, Clone, PartialEq)]
pub struct FadeOut {
    /// Volume before the fade started (restored afterwards)
    original_volume: f32,

    /// Total number of steps
    steps: u32,

    /// Steps already applied (monotonic)
    completed: u32,

    /// Total fade length in milliseconds
    duration_ms: i64,

    /// When the fade started
    started_at: DateTime<Utc>,
}

impl FadeOut {
    /// Start a fade from `original_volume`
    ///
    /// `steps` is raised to at least 1.
    pub fn new(
        original_volume: f32,
        steps: u32,
        duration: std::time::Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        let duration_ms = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self {
            original_volume,
            steps: steps.max(1),
            completed: 0,
            duration_ms,
            started_at,
        }
    }

    /// Volume to restore once the fade ends or is cancelled
    pub fn original_volume(&self) -> f32 {
        self.original_volume
    }

    /// Total number of steps
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Steps applied so far
    pub fn completed_steps(&self) -> u32 {
        self.completed
    }

    /// Whether every step has been applied
    pub fn is_finished(&self) -> bool {
        self.completed >= self.steps
    }

    /// Volume after `step` steps
    pub fn volume_at(&self, step: u32) -> f32 {
        let remaining = self.steps.saturating_sub(step);
        self.original_volume * remaining as f32 / self.steps as f32
    }

    /// When the next step is due, `None` once finished
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        if self.is_finished() {
            return None;
        }
        let step = i64::from(self.completed + 1);
        let offset_ms = self.duration_ms.saturating_mul(step) / i64::from(self.steps);
        Some(self.started_at + Duration::milliseconds(offset_ms))
    }

    /// Whether the next step is due at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_deadline().is_some_and(|deadline| deadline <= now)
    }

    /// Apply the next step
    ///
    /// Returns [`FadeStep::Finished`] for the final step and for any call
    /// after it.
    pub fn advance(&mut self) -> FadeStep {
        if self.is_finished() {
            return FadeStep::Finished;
        }
        self.completed += 1;
        if self.is_finished() {
            FadeStep::Finished
        } else {
            FadeStep::Volume(self.volume_at(self.completed))
        }
    }
}
