//! History Dreams Host Library
//!
//! Composition root for shells embedding the playback core: layered
//! configuration, tracing setup and wiring of store, preferences and the
//! session task.

pub mod config;
pub mod error;
pub mod logging;
pub mod state;

// Re-export commonly used types for convenience
pub use config::HostConfig;
pub use error::{HostError, Result};
pub use state::AppState;
