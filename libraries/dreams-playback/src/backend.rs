//! Platform media collaborators
//!
//! The session never talks to a platform player directly. Hosts implement
//! [`MediaBackend`] over their native player and [`AudioSession`] over their
//! audio-focus API, and forward asynchronous player results as
//! [`MediaEvent`]s.

use crate::error::Result;
use crate::types::LoadToken;

/// Single platform player
///
/// Calls are fire-and-forget: `load` only starts resolving the media. The
/// outcome arrives later as a [`MediaEvent`] tagged with the same token.
pub trait MediaBackend: Send {
    /// Replace the current item with the media at `locator`
    ///
    /// Returns an error only when the locator cannot be used at all.
    fn load(&mut self, token: LoadToken, locator: &str) -> Result<()>;

    /// Drop the current item and stop emitting events for it
    fn unload(&mut self);

    /// Start or resume the transport
    fn play(&mut self);

    /// Pause the transport
    fn pause(&mut self);

    /// Move to an absolute position in seconds
    fn seek(&mut self, seconds: f64);

    /// Current position in seconds
    fn position(&self) -> f64;

    /// Current output volume (0.0 - 1.0)
    fn volume(&self) -> f32;

    /// Set the output volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32);

    /// Set the playback rate (1.0 = normal speed)
    fn set_rate(&mut self, rate: f32);
}

/// Platform audio-focus / output session
pub trait AudioSession: Send {
    /// Claim the audio output for playback
    fn activate(&mut self) -> Result<()>;

    /// Release the audio output
    fn deactivate(&mut self);
}

/// Asynchronous result from the player
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    /// Player instance the event belongs to
    pub token: LoadToken,

    /// What happened
    pub kind: MediaEventKind,
}

impl MediaEvent {
    /// The media resolved its duration
    pub fn ready(token: LoadToken, duration: f64) -> Self {
        Self {
            token,
            kind: MediaEventKind::Ready { duration },
        }
    }

    /// The media could not be loaded
    pub fn failed(token: LoadToken, message: impl Into<String>) -> Self {
        Self {
            token,
            kind: MediaEventKind::Failed {
                message: message.into(),
            },
        }
    }

    /// Playback reached the end of the media
    pub fn ended(token: LoadToken) -> Self {
        Self {
            token,
            kind: MediaEventKind::Ended,
        }
    }
}

/// Kind of player notification
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// Media is ready; `duration` in seconds (may be NaN or infinite for
    /// streams, which the session ignores)
    Ready { duration: f64 },

    /// Media failed to load
    Failed { message: String },

    /// End of media
    Ended,
}
