//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// None of these are fatal: the session degrades to "nothing is playing" and
/// keeps the error around for inspection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// No playable resource, or the backend refused it
    #[error("Media load failed: {0}")]
    MediaLoad(String),

    /// The audio session could not be activated (busy or denied)
    #[error("Audio session activation failed: {0}")]
    SessionActivation(String),

    /// The media never reported a usable duration
    #[error("Media was not ready after {seconds}s")]
    ReadyTimeout { seconds: u64 },

    /// No story is loaded
    #[error("No story loaded")]
    NoStoryLoaded,

    /// Invalid duration for a timer or fade
    #[error("Invalid duration: {0:?}")]
    InvalidDuration(std::time::Duration),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// The session task has shut down
    #[error("Session is no longer running")]
    ChannelClosed,
}

impl From<dreams_core::DreamsError> for PlaybackError {
    fn from(err: dreams_core::DreamsError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
