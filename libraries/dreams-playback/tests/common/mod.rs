//! Shared test doubles for session tests

#![allow(dead_code)]

use dreams_core::{Category, Clock, KeyValueStore, ManualClock, Story};
use dreams_playback::{
    AudioSession, LoadToken, MediaBackend, PlaybackError, Result, SessionConfig, SessionContext,
    SessionController, TokioClock,
};
use dreams_storage::{MemoryStore, PreferencesStore};
use std::sync::{Arc, Mutex, MutexGuard};

// ===== Media backend =====

/// Everything the mock player has been told
#[derive(Debug)]
pub struct PlayerLog {
    pub locator: Option<String>,
    pub token: Option<LoadToken>,
    pub playing: bool,
    pub position: f64,
    pub volume: f32,
    pub rate: f32,
    pub volume_history: Vec<f32>,
    pub seeks: Vec<f64>,
    pub loads: usize,
    pub unloads: usize,
    pub fail_next_load: bool,
}

impl Default for PlayerLog {
    fn default() -> Self {
        Self {
            locator: None,
            token: None,
            playing: false,
            position: 0.0,
            volume: 1.0,
            rate: 1.0,
            volume_history: Vec::new(),
            seeks: Vec::new(),
            loads: 0,
            unloads: 0,
            fail_next_load: false,
        }
    }
}

/// Player double sharing its log with the test
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    log: Arc<Mutex<PlayerLog>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MutexGuard<'_, PlayerLog> {
        self.log.lock().unwrap()
    }

    /// Pretend the transport moved on
    pub fn set_position(&self, seconds: f64) {
        self.log().position = seconds;
    }

    pub fn token(&self) -> LoadToken {
        self.log().token.expect("nothing loaded")
    }
}

impl MediaBackend for MockBackend {
    fn load(&mut self, token: LoadToken, locator: &str) -> Result<()> {
        let mut log = self.log();
        if std::mem::take(&mut log.fail_next_load) {
            return Err(PlaybackError::MediaLoad(format!("cannot open {locator}")));
        }
        log.locator = Some(locator.to_string());
        log.token = Some(token);
        log.position = 0.0;
        log.playing = false;
        log.loads += 1;
        Ok(())
    }

    fn unload(&mut self) {
        let mut log = self.log();
        log.locator = None;
        log.playing = false;
        log.unloads += 1;
    }

    fn play(&mut self) {
        self.log().playing = true;
    }

    fn pause(&mut self) {
        self.log().playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        let mut log = self.log();
        log.position = seconds;
        log.seeks.push(seconds);
    }

    fn position(&self) -> f64 {
        self.log().position
    }

    fn volume(&self) -> f32 {
        self.log().volume
    }

    fn set_volume(&mut self, volume: f32) {
        let mut log = self.log();
        log.volume = volume;
        log.volume_history.push(volume);
    }

    fn set_rate(&mut self, rate: f32) {
        self.log().rate = rate;
    }
}

// ===== Audio session =====

#[derive(Debug, Default)]
pub struct FocusLog {
    pub activations: usize,
    pub deactivations: usize,
    pub fail: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockAudioSession {
    log: Arc<Mutex<FocusLog>>,
}

impl MockAudioSession {
    pub fn log(&self) -> MutexGuard<'_, FocusLog> {
        self.log.lock().unwrap()
    }

    pub fn set_failing(&self, fail: bool) {
        self.log().fail = fail;
    }
}

impl AudioSession for MockAudioSession {
    fn activate(&mut self) -> Result<()> {
        let mut log = self.log();
        if log.fail {
            return Err(PlaybackError::SessionActivation("output busy".to_string()));
        }
        log.activations += 1;
        Ok(())
    }

    fn deactivate(&mut self) {
        self.log().deactivations += 1;
    }
}

// ===== Harness =====

/// Mocks plus the shared stores, ready to build controllers
pub struct Harness {
    pub backend: MockBackend,
    pub audio: MockAudioSession,
    pub store: Arc<MemoryStore>,
    pub preferences: Arc<PreferencesStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let preferences = Arc::new(PreferencesStore::load_or_default(store.clone()));
        Self {
            backend: MockBackend::new(),
            audio: MockAudioSession::default(),
            store,
            preferences,
            clock: Arc::new(ManualClock::starting_now()),
        }
    }

    pub fn controller(&self) -> SessionController {
        self.controller_with(SessionConfig::default())
    }

    pub fn controller_with(&self, config: SessionConfig) -> SessionController {
        self.controller_on(self.clock.clone(), config)
    }

    /// Controller on tokio's clock, for driver tests
    pub fn tokio_controller(&self) -> SessionController {
        self.controller_on(Arc::new(TokioClock::new()), SessionConfig::default())
    }

    fn controller_on(&self, clock: Arc<dyn Clock>, config: SessionConfig) -> SessionController {
        let store: Arc<dyn KeyValueStore> = self.store.clone();
        SessionController::new(SessionContext {
            backend: Box::new(self.backend.clone()),
            audio_session: Box::new(self.audio.clone()),
            preferences: Arc::clone(&self.preferences),
            store,
            clock,
            config,
        })
    }

    pub fn clock_now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Move the manual clock forward
    pub fn advance_ms(&self, millis: i64) {
        self.clock.advance(chrono::Duration::milliseconds(millis));
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(chrono::Duration::seconds(secs));
    }

    /// Load `story` and report its duration
    pub fn load_ready(&self, session: &mut SessionController, story: Story, duration: f64) {
        session.load_story(story);
        session.on_media_event(dreams_playback::MediaEvent::ready(session.token(), duration));
    }
}

/// Story with an audio locator
pub fn story(title: &str) -> Story {
    Story::new(title, Category::MedievalTimes)
        .with_narrator("Test Narrator")
        .with_audio_url(format!("stories/{}.m4a", title.to_lowercase().replace(' ', "-")))
}
