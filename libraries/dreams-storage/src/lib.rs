//! History Dreams Storage
//!
//! Key-value persistence for user preferences, the playback-state snapshot
//! and per-story progress.
//!
//! # Architecture
//!
//! - **One blob per concern**: preferences and playback state are each a
//!   single JSON document under a fixed key
//! - **Vertical Slicing**: each feature owns its key and its encode/decode
//! - **Forgiving reads**: absent or corrupt data decodes to defaults
//!
//! # Example
//!
//! ```rust
//! use dreams_storage::{playback_state, MemoryStore, PreferencesStore};
//! use dreams_core::PlaybackState;
//! use std::sync::Arc;
//!
//! # fn example() -> dreams_core::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//!
//! let prefs = PreferencesStore::load_or_default(store.clone());
//! prefs.set_volume(0.8)?;
//!
//! playback_state::save(&*store, &PlaybackState::initial().with_time(12.0))?;
//! let restored = playback_state::load(&*store);
//! assert_eq!(restored.current_time, 12.0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod file;
mod memory;

// Vertical slices
pub mod library;
pub mod playback_state;
pub mod preferences;
pub mod progress;

pub use file::FileStore;
pub use library::StoryLibrary;
pub use memory::MemoryStore;
pub use preferences::PreferencesStore;
