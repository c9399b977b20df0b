//! System events
//!
//! Typed notifications from the host platform. The session reacts to these
//! instead of subscribing to string-keyed notification centres.

use serde::{Deserialize, Serialize};

/// Platform event that affects the audio session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemEvent {
    /// Another app or a call took the audio focus
    InterruptionBegan,

    /// The interruption ended
    InterruptionEnded {
        /// Whether the platform allows playback to resume
        should_resume: bool,
    },

    /// The audio route changed
    RouteChanged {
        /// Why the route changed
        reason: RouteChangeReason,
    },

    /// The app moved to the background
    EnteredBackground,

    /// The app returned to the foreground
    EnteredForeground,
}

/// Reason for an audio route change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteChangeReason {
    /// The previous output disappeared (headphones unplugged, Bluetooth lost)
    OldDeviceUnavailable,

    /// A new output became available
    NewDeviceAvailable,

    /// The session category changed
    CategoryChange,

    /// Anything else
    Other,
}

impl SystemEvent {
    /// Route change with the given reason
    pub fn route_changed(reason: RouteChangeReason) -> Self {
        Self::RouteChanged { reason }
    }
}
