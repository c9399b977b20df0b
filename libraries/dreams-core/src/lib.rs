//! History Dreams Core
//!
//! Platform-agnostic core types, traits, and error handling for History Dreams.
//!
//! This crate provides the foundational building blocks shared by the storage
//! layer, the playback session and the embedding host.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Story`, `PlaybackState`, `UserPreferences`
//! - **Core Traits**: `KeyValueStore`, `Clock`
//! - **Error Handling**: Unified `DreamsError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use dreams_core::types::{Category, PlaybackState, Story};
//!
//! let story = Story::new("The Fall of Rome", Category::AncientCivilizations)
//!     .with_narrator("Marcus")
//!     .with_audio_url("file:///stories/rome.mp3");
//!
//! let state = PlaybackState::initial().with_story(Some(story.id.clone()));
//! assert_eq!(state.current_story_id, Some(story.id));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use clock::{ManualClock, SystemClock};
pub use error::{DreamsError, Result};
pub use traits::{Clock, KeyValueStore};

pub use types::{Category, PlaybackState, Story, StoryId, UserPreferences};
