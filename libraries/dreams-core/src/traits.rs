/// Core traits for History Dreams
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Durable key-value store
///
/// Implementers persist small string blobs (JSON text) under string keys.
/// Every call is synchronous and atomic; concurrent writers are
/// last-writer-wins.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key` (no-op if absent)
    fn remove(&self, key: &str) -> Result<()>;
}

/// Wall-clock source
///
/// The session reads time only through this trait so hosts and tests can
/// drive sleep timers and fades without waiting on real time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}
