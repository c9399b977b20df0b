/// Host configuration
use crate::error::{HostError, Result};
use dreams_playback::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dreams.toml";

/// Prefix of environment overrides (`DREAMS_SESSION__FADE_STEPS=20`)
pub const ENV_PREFIX: &str = "DREAMS";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_session")]
    pub session: SessionSettings,

    #[serde(default = "default_logging")]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageSettings {
    /// JSON document holding preferences, playback state and progress
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionSettings {
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    #[serde(default = "default_persist_interval_ms")]
    pub persist_interval_ms: u64,

    #[serde(default = "default_timer_interval_ms")]
    pub timer_interval_ms: u64,

    #[serde(default = "default_fade_steps")]
    pub fade_steps: u32,

    #[serde(default = "default_max_fade_seconds")]
    pub max_fade_seconds: u64,

    #[serde(default = "default_ready_timeout_seconds")]
    pub ready_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
}

impl HostConfig {
    /// Load `dreams.toml` (if present) and environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load the given file (if present) and environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }

        // Nested keys use a double underscore: DREAMS_STORAGE__STATE_FILE
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let session = &self.session;
        for (name, value) in [
            ("progress_interval_ms", session.progress_interval_ms),
            ("persist_interval_ms", session.persist_interval_ms),
            ("timer_interval_ms", session.timer_interval_ms),
            ("ready_timeout_seconds", session.ready_timeout_seconds),
        ] {
            if value == 0 {
                return Err(HostError::Config(format!("session.{name} must be positive")));
            }
        }

        if session.fade_steps == 0 {
            return Err(HostError::Config(
                "session.fade_steps must be at least 1".to_string(),
            ));
        }

        if self.storage.state_file.as_os_str().is_empty() {
            return Err(HostError::Config(
                "storage.state_file must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Timing configuration for the playback session
    pub fn to_session_config(&self) -> SessionConfig {
        let session = &self.session;
        SessionConfig {
            progress_interval: Duration::from_millis(session.progress_interval_ms),
            persist_interval: Duration::from_millis(session.persist_interval_ms),
            timer_interval: Duration::from_millis(session.timer_interval_ms),
            fade_steps: session.fade_steps,
            max_fade_duration: Duration::from_secs(session.max_fade_seconds),
            ready_timeout: Duration::from_secs(session.ready_timeout_seconds),
        }
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        state_file: default_state_file(),
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from("./data/history-dreams.json")
}

fn default_session() -> SessionSettings {
    SessionSettings {
        progress_interval_ms: default_progress_interval_ms(),
        persist_interval_ms: default_persist_interval_ms(),
        timer_interval_ms: default_timer_interval_ms(),
        fade_steps: default_fade_steps(),
        max_fade_seconds: default_max_fade_seconds(),
        ready_timeout_seconds: default_ready_timeout_seconds(),
    }
}

fn default_progress_interval_ms() -> u64 {
    500
}

fn default_persist_interval_ms() -> u64 {
    1000
}

fn default_timer_interval_ms() -> u64 {
    1000
}

fn default_fade_steps() -> u32 {
    50
}

fn default_max_fade_seconds() -> u64 {
    600
}

fn default_ready_timeout_seconds() -> u64 {
    30
}

fn default_logging() -> LoggingSettings {
    LoggingSettings {
        level: default_level(),
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            session: default_session(),
            logging: default_logging(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_defaults() {
        let config = HostConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.to_session_config(), SessionConfig::default());
    }

    #[test]
    fn zero_fade_steps_rejected() {
        let mut config = HostConfig::default();
        config.session.fade_steps = 0;
        assert!(matches!(config.validate(), Err(HostError::Config(_))));
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = HostConfig::default();
        config.session.timer_interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timer_interval_ms"));
    }
}
