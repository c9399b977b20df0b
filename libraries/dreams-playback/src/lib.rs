//! History Dreams - Playback Session
//!
//! Platform-agnostic playback session management for History Dreams.
//!
//! This crate provides:
//! - Transport control (play, pause, toggle, seek by fraction)
//! - Sleep timer with pause or fade-out at expiry
//! - Stepped linear fade-out ramp
//! - Progress sampling with throttled position persistence
//! - Interruption, route-change and background handling
//! - Completion handling with an autoplay up-next queue
//! - A tokio driver that serializes every input into the session
//!
//! # Architecture
//!
//! `dreams-playback` never touches a platform API:
//! - The player is a [`MediaBackend`]
//! - Audio focus is an [`AudioSession`]
//! - Platform notifications arrive as typed [`SystemEvent`]s
//! - Time comes from a [`dreams_core::Clock`]
//!
//! [`SessionController`] is a synchronous state machine and can be driven
//! directly (tests do this with a manual clock). [`spawn_session`] runs it
//! on a tokio task behind a cloneable [`SessionHandle`].
//!
//! # Example
//!
//! ```rust
//! use dreams_core::{Category, ManualClock, Story};
//! use dreams_playback::{
//!     AudioSession, LoadToken, MediaBackend, MediaEvent, Result, SessionConfig,
//!     SessionContext, SessionController, SessionStatus,
//! };
//! use dreams_storage::{MemoryStore, PreferencesStore};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct SilentPlayer {
//!     position: f64,
//! }
//!
//! impl MediaBackend for SilentPlayer {
//!     fn load(&mut self, _token: LoadToken, _locator: &str) -> Result<()> {
//!         Ok(())
//!     }
//!     fn unload(&mut self) {}
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, seconds: f64) {
//!         self.position = seconds;
//!     }
//!     fn position(&self) -> f64 {
//!         self.position
//!     }
//!     fn volume(&self) -> f32 {
//!         1.0
//!     }
//!     fn set_volume(&mut self, _volume: f32) {}
//!     fn set_rate(&mut self, _rate: f32) {}
//! }
//!
//! struct NoFocus;
//!
//! impl AudioSession for NoFocus {
//!     fn activate(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!     fn deactivate(&mut self) {}
//! }
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut session = SessionController::new(SessionContext {
//!     backend: Box::new(SilentPlayer::default()),
//!     audio_session: Box::new(NoFocus),
//!     preferences: Arc::new(PreferencesStore::load_or_default(store.clone())),
//!     store,
//!     clock: Arc::new(ManualClock::starting_now()),
//!     config: SessionConfig::default(),
//! });
//!
//! let story = Story::new("The Library of Alexandria", Category::AncientCivilizations)
//!     .with_audio_url("stories/alexandria.m4a");
//! session.load_story(story);
//! session.on_media_event(MediaEvent::ready(session.token(), 1800.0));
//!
//! session.seek(0.5);
//! assert_eq!(session.state().current_time, 900.0);
//!
//! session.play();
//! assert_eq!(session.status(), SessionStatus::Playing);
//! ```

pub mod backend;
pub mod driver;
pub mod error;
pub mod events;
pub mod fade;
pub mod queue;
pub mod session;
pub mod timer;
pub mod types;

pub use backend::{AudioSession, MediaBackend, MediaEvent, MediaEventKind};
pub use driver::{spawn_session, SessionHandle, TokioClock};
pub use error::{PlaybackError, Result};
pub use events::{RouteChangeReason, SystemEvent};
pub use fade::{FadeOut, FadeStep};
pub use queue::UpNext;
pub use session::{SessionContext, SessionController};
pub use timer::{format_time, SleepTimerHost, TimerController, TimerPreset};
pub use types::{ExpiryAction, LoadToken, SessionConfig, SessionSnapshot, SessionStatus};
