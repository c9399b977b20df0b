//! Session controller - core orchestration
//!
//! Owns the live player, the current [`PlaybackState`], the sleep timer, the
//! fade-out ramp and the up-next queue. Every input (user intents, player
//! notifications, platform events and periodic ticks) goes through one
//! `&mut self` method, so the controller is a plain single-writer state
//! machine. [`crate::driver`] runs it inside a tokio task.

use crate::{
    backend::{AudioSession, MediaBackend, MediaEvent, MediaEventKind},
    error::{PlaybackError, Result},
    events::{RouteChangeReason, SystemEvent},
    fade::{FadeOut, FadeStep},
    queue::UpNext,
    timer::SleepTimerHost,
    types::{ExpiryAction, LoadToken, SessionConfig, SessionSnapshot, SessionStatus},
};
use chrono::{DateTime, Utc};
use dreams_core::types::clamp_progress;
use dreams_core::{Clock, KeyValueStore, PlaybackState, Story};
use dreams_storage::{playback_state, progress, PreferencesStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Collaborators handed to a [`SessionController`]
pub struct SessionContext {
    /// Platform player
    pub backend: Box<dyn MediaBackend>,

    /// Platform audio-focus session
    pub audio_session: Box<dyn AudioSession>,

    /// Shared user preferences
    pub preferences: Arc<PreferencesStore>,

    /// Store for the playback-state blob and per-story progress
    pub store: Arc<dyn KeyValueStore>,

    /// Time source for the sleep timer, fades and load timeouts
    pub clock: Arc<dyn Clock>,

    /// Timing configuration
    pub config: SessionConfig,
}

/// Playback session for one listener
pub struct SessionController {
    backend: Box<dyn MediaBackend>,
    audio_session: Box<dyn AudioSession>,
    preferences: Arc<PreferencesStore>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,

    state: PlaybackState,
    status: SessionStatus,
    story: Option<Story>,
    token: LoadToken,

    /// Progress to seek to once the media reports its duration
    pending_restore: Option<f64>,

    /// When the current load started, cleared once the media is ready
    loading_since: Option<DateTime<Utc>>,

    /// Playback position at the last progress write
    last_persisted_time: f64,

    /// Whether playback was running when an interruption began
    resume_after_interruption: bool,

    sleep_action: ExpiryAction,
    fade: Option<FadeOut>,
    up_next: UpNext,
    last_error: Option<PlaybackError>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("status", &self.status)
            .field("token", &self.token)
            .field("fade", &self.fade)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Create a session
    ///
    /// Restores the persisted playback snapshot (never as playing, and
    /// without a timer that has already run out) and activates the audio
    /// session. An activation failure is recorded, not returned; it is
    /// retried when the app returns to the foreground.
    pub fn new(context: SessionContext) -> Self {
        let SessionContext {
            backend,
            audio_session,
            preferences,
            store,
            clock,
            config,
        } = context;

        let now = clock.now();
        let mut state = playback_state::load(store.as_ref()).with_playing(false);
        if state.sleep_timer_end.is_some() && !state.has_active_timer(now) {
            state = state.with_timer_end(None);
        }
        let sleep_action = default_expiry_action(&preferences);

        let mut session = Self {
            backend,
            audio_session,
            preferences,
            store,
            clock,
            config,
            last_persisted_time: state.current_time,
            state,
            status: SessionStatus::Unloaded,
            story: None,
            token: LoadToken::default(),
            pending_restore: None,
            loading_since: None,
            resume_after_interruption: false,
            sleep_action,
            fade: None,
            up_next: UpNext::new(),
            last_error: None,
        };
        session.activate_audio_session();
        session
    }

    // ===== Loading =====

    /// Make `story` the active story
    ///
    /// Tears down the previous player first. A story without an audio
    /// locator, or one the backend refuses, leaves the session
    /// [`SessionStatus::Unloaded`] with a [`PlaybackError::MediaLoad`].
    pub fn load_story(&mut self, mut story: Story) {
        self.teardown_player();
        self.last_error = None;
        self.token = self.token.next();

        let prefs = self.preferences.get();
        self.pending_restore = if prefs.remember_playback_position {
            let saved = progress::load(self.store.as_ref(), &story.id);
            (saved > 0.0 && saved < 1.0).then_some(saved)
        } else {
            None
        };

        story.duration = 0.0;
        self.state = self
            .state
            .with_story(Some(story.id.clone()))
            .with_time(0.0)
            .with_playing(false);
        self.last_persisted_time = 0.0;

        info!(
            story_id = %story.id,
            token = self.token.value(),
            "Loading story: {}",
            story.title
        );

        let locator = story.audio_url.clone();
        self.story = Some(story);

        let loaded = match locator {
            Some(locator) => self.backend.load(self.token, &locator),
            None => Err(PlaybackError::MediaLoad(
                "story has no audio locator".to_string(),
            )),
        };

        match loaded {
            Ok(()) => {
                self.status = SessionStatus::Loading;
                self.loading_since = Some(self.clock.now());
                self.apply_preferences();
            }
            Err(err) => {
                self.status = SessionStatus::Unloaded;
                self.pending_restore = None;
                self.record_error(err);
            }
        }

        self.persist_state();
    }

    /// Load a bare locator as a placeholder story
    pub fn load_locator(&mut self, locator: impl Into<String>) {
        self.load_story(Story::placeholder(locator));
    }

    // ===== Transport =====

    /// Start or resume playback
    ///
    /// Restarts from the beginning when the story has completed. Does
    /// nothing when no player is loaded.
    pub fn play(&mut self) {
        if !self.status.has_player() {
            debug!("Play ignored: nothing loaded");
            return;
        }
        self.cancel_fade();

        if self.status == SessionStatus::Completed {
            self.backend.seek(0.0);
            self.state = self.state.with_time(0.0);
            self.last_persisted_time = 0.0;
        }

        self.backend.play();
        self.state = self.state.with_playing(true);
        if self.status != SessionStatus::Loading {
            self.status = SessionStatus::Playing;
        }
        info!(position = self.state.current_time, "Playback started");
        self.persist_state();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if !self.status.has_player() {
            debug!("Pause ignored: nothing loaded");
            return;
        }
        self.cancel_fade();
        self.pause_transport();
        info!(position = self.state.current_time, "Playback paused");
        self.persist_state();
    }

    /// Pause when playing, play otherwise
    pub fn toggle_playback(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to a fraction of the story
    ///
    /// `progress` is clamped into `[0, 1]`. Does nothing without a loaded
    /// story.
    pub fn seek(&mut self, progress: f64) {
        if !self.status.has_player() {
            debug!("Seek ignored: nothing loaded");
            return;
        }
        let Some(story) = self.story.as_mut() else {
            return;
        };

        let progress = clamp_progress(progress);
        let duration = story.duration;
        let target = progress * duration;
        if duration > 0.0 {
            story.progress = Some(progress);
        }

        self.cancel_fade();
        self.backend.seek(target);
        self.state = self.state.with_time(target);
        if self.status == SessionStatus::Completed && target < duration {
            self.status = SessionStatus::Paused;
        }
        debug!(progress, target, "Seek");
        self.persist_state();
    }

    // ===== Sleep timer =====

    /// Start the sleep timer with the action chosen by the preferences
    pub fn start_sleep_timer(&mut self, duration: Duration) -> Result<()> {
        let action = default_expiry_action(&self.preferences);
        self.start_sleep_timer_with(duration, action)
    }

    /// Start the sleep timer, replacing any running one
    pub fn start_sleep_timer_with(&mut self, duration: Duration, action: ExpiryAction) -> Result<()> {
        if duration.is_zero() {
            return Err(PlaybackError::InvalidDuration(duration));
        }
        let span = chrono::Duration::from_std(duration)
            .map_err(|_| PlaybackError::InvalidDuration(duration))?;

        let end = self.clock.now() + span;
        self.state = self.state.with_timer_end(Some(end));
        self.sleep_action = action;
        info!(seconds = duration.as_secs(), ?action, "Sleep timer started");
        self.persist_state();
        Ok(())
    }

    /// Clear the sleep timer
    pub fn cancel_sleep_timer(&mut self) {
        if self.state.sleep_timer_end.is_none() {
            return;
        }
        self.state = self.state.with_timer_end(None);
        info!("Sleep timer cancelled");
        self.persist_state();
    }

    /// Whether the sleep timer is counting down
    pub fn has_active_sleep_timer(&self) -> bool {
        self.state.has_active_timer(self.clock.now())
    }

    /// Time left on the sleep timer
    pub fn sleep_timer_remaining(&self) -> Option<Duration> {
        remaining_until(self.state.sleep_timer_end, self.clock.now())
    }

    /// What the running timer does when it expires
    pub fn sleep_timer_action(&self) -> Option<ExpiryAction> {
        self.state.sleep_timer_end.map(|_| self.sleep_action)
    }

    // ===== Fade-out =====

    /// Fade out over `duration` with the configured number of steps, then pause
    pub fn fade_out_and_stop(&mut self, duration: Duration) -> Result<()> {
        self.fade_out_and_stop_with_steps(duration, self.config.fade_steps)
    }

    /// Fade out over `duration` in `steps` equal volume steps, then pause
    ///
    /// Replaces any fade already running. Durations longer than
    /// [`SessionConfig::max_fade_duration`] are shortened to it.
    pub fn fade_out_and_stop_with_steps(&mut self, duration: Duration, steps: u32) -> Result<()> {
        if !self.status.has_player() {
            return Err(PlaybackError::NoStoryLoaded);
        }
        self.cancel_fade();

        let duration = duration.min(self.config.max_fade_duration);
        let fade = FadeOut::new(self.backend.volume(), steps, duration, self.clock.now());
        info!(
            seconds = duration.as_secs_f64(),
            steps = fade.steps(),
            "Fade-out started"
        );
        self.fade = Some(fade);
        Ok(())
    }

    /// Apply every fade step that is due
    ///
    /// After the final step the transport pauses and the original volume is
    /// restored.
    pub fn on_fade_tick(&mut self) {
        let now = self.clock.now();
        while let Some(fade) = self.fade.as_mut() {
            if !fade.is_due(now) {
                break;
            }
            match fade.advance() {
                FadeStep::Volume(volume) => self.backend.set_volume(volume),
                FadeStep::Finished => {
                    let original = fade.original_volume();
                    self.fade = None;
                    self.backend.set_volume(0.0);
                    self.pause_transport();
                    self.backend.set_volume(original);
                    info!("Fade-out finished");
                    self.persist_state();
                }
            }
        }
    }

    /// Whether a fade-out is running
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// When the next fade step is due
    pub fn next_fade_deadline(&self) -> Option<DateTime<Utc>> {
        self.fade.as_ref().and_then(FadeOut::next_deadline)
    }

    // ===== Periodic work =====

    /// Sample the player position
    ///
    /// Story progress is written at most once per
    /// [`SessionConfig::persist_interval`] of playback, and only when the
    /// listener wants positions remembered.
    pub fn on_progress_tick(&mut self) {
        if !self.state.is_playing || self.status != SessionStatus::Playing {
            return;
        }
        let Some(story) = self.story.as_mut() else {
            return;
        };

        let position = self.backend.position();
        if !position.is_finite() {
            return;
        }
        let duration = story.duration.max(0.0);
        let time = position.clamp(0.0, duration);
        if duration > 0.0 {
            story.progress = Some(time / duration);
        }
        self.state = self.state.with_time(time);
        debug!(position = time, "Progress");

        let throttle = self.config.persist_interval.as_secs_f64();
        if self.preferences.get().remember_playback_position
            && (time - self.last_persisted_time).abs() >= throttle
        {
            self.persist_progress();
            self.persist_state();
            self.last_persisted_time = time;
        }
    }

    /// Check the load timeout and the sleep timer
    pub fn on_timer_tick(&mut self) {
        let now = self.clock.now();

        if let Some(since) = self.loading_since {
            let timeout = chrono::Duration::from_std(self.config.ready_timeout)
                .unwrap_or_else(|_| chrono::Duration::zero());
            if self.status == SessionStatus::Loading && now - since >= timeout {
                warn!(
                    seconds = self.config.ready_timeout.as_secs(),
                    "Media did not become ready"
                );
                self.teardown_player();
                self.status = SessionStatus::Unloaded;
                self.state = self.state.with_playing(false);
                self.record_error(PlaybackError::ReadyTimeout {
                    seconds: self.config.ready_timeout.as_secs(),
                });
                self.persist_state();
            }
        }

        if self.state.sleep_timer_end.is_some() && !self.state.has_active_timer(now) {
            self.expire_sleep_timer();
        }
    }

    fn expire_sleep_timer(&mut self) {
        self.state = self.state.with_timer_end(None);
        self.persist_state();
        info!(action = ?self.sleep_action, "Sleep timer expired");

        if self.sleep_action == ExpiryAction::FadeOut && self.state.is_playing {
            let seconds = self.preferences.get().fade_out_duration;
            if self
                .fade_out_and_stop(Duration::from_secs(u64::from(seconds)))
                .is_ok()
            {
                return;
            }
        }
        self.pause();
    }

    // ===== Notifications =====

    /// Handle an asynchronous player notification
    ///
    /// Events from a player that has since been replaced are dropped.
    pub fn on_media_event(&mut self, event: MediaEvent) {
        if event.token != self.token {
            debug!(
                stale = event.token.value(),
                current = self.token.value(),
                "Ignoring event from a previous player"
            );
            return;
        }

        match event.kind {
            MediaEventKind::Ready { duration } => self.handle_ready(duration),
            MediaEventKind::Failed { message } => {
                self.teardown_player();
                self.status = SessionStatus::Unloaded;
                self.state = self.state.with_playing(false);
                self.record_error(PlaybackError::MediaLoad(message));
                self.persist_state();
            }
            MediaEventKind::Ended => self.handle_completion(),
        }
    }

    fn handle_ready(&mut self, duration: f64) {
        if self.status != SessionStatus::Loading {
            debug!(status = ?self.status, "Ready ignored outside of loading");
            return;
        }
        if !duration.is_finite() || duration < 0.0 {
            warn!(duration, "Media reported an unusable duration, still loading");
            return;
        }
        let Some(story) = self.story.as_mut() else {
            return;
        };
        story.duration = duration;

        self.loading_since = None;
        self.status = if self.state.is_playing {
            SessionStatus::Playing
        } else {
            SessionStatus::Ready
        };

        if let Some(saved) = self.pending_restore.take().filter(|_| duration > 0.0) {
            let target = saved * duration;
            story.progress = Some(saved);
            self.backend.seek(target);
            self.state = self.state.with_time(target);
            self.last_persisted_time = target;
            info!(position = target, "Restored saved position");
        }

        info!(duration, "Media ready");
        self.persist_state();
    }

    fn handle_completion(&mut self) {
        self.cancel_fade();
        let Some(story) = self.story.as_mut() else {
            return;
        };

        story.progress = Some(1.0);
        story.last_played = Some(self.clock.now());
        if let Err(err) = progress::save(self.store.as_ref(), &story.id, 1.0) {
            warn!(error = %err, "Failed to save completed progress");
        }

        self.state = self
            .state
            .with_time(story.duration)
            .with_playing(false)
            .with_timer_end(None);
        self.last_persisted_time = story.duration;
        self.status = SessionStatus::Completed;
        info!(story_id = %story.id, "Story completed");
        self.persist_state();

        if self.preferences.get().autoplay_enabled {
            if let Some(next) = self.up_next.pop() {
                info!(story_id = %next.id, "Autoplaying next story");
                self.load_story(next);
                self.play();
            }
        }
    }

    /// React to a platform event
    pub fn on_system_event(&mut self, event: SystemEvent) {
        debug!(?event, "System event");
        match event {
            SystemEvent::InterruptionBegan => {
                self.resume_after_interruption = self.state.is_playing;
                if self.state.is_playing {
                    self.pause();
                }
            }
            SystemEvent::InterruptionEnded { should_resume } => {
                self.activate_audio_session();
                let resume = std::mem::take(&mut self.resume_after_interruption);
                if resume && should_resume {
                    self.play();
                }
            }
            SystemEvent::RouteChanged { reason } => match reason {
                RouteChangeReason::OldDeviceUnavailable => self.pause(),
                RouteChangeReason::NewDeviceAvailable | RouteChangeReason::CategoryChange => {
                    self.activate_audio_session();
                }
                RouteChangeReason::Other => {}
            },
            SystemEvent::EnteredBackground => {
                if !self.preferences.get().background_playback_enabled {
                    self.pause();
                }
            }
            SystemEvent::EnteredForeground => self.activate_audio_session(),
        }
    }

    // ===== Up-next queue =====

    /// Queue a story for autoplay
    pub fn enqueue(&mut self, story: Story) {
        debug!(story_id = %story.id, "Queued story");
        self.up_next.push(story);
    }

    /// Drop every queued story
    pub fn clear_queue(&mut self) {
        self.up_next.clear();
    }

    /// Stories waiting for autoplay
    pub fn up_next(&self) -> &UpNext {
        &self.up_next
    }

    // ===== Preferences =====

    /// Push the preferred volume and speed to the player
    ///
    /// Volume is left alone while a fade is running.
    pub fn apply_preferences(&mut self) {
        if !self.status.has_player() {
            return;
        }
        let prefs = self.preferences.get();
        if self.fade.is_none() {
            self.backend.set_volume(prefs.volume);
        }
        self.backend.set_rate(prefs.playback_speed);
    }

    /// Shared preferences
    pub fn preferences(&self) -> &Arc<PreferencesStore> {
        &self.preferences
    }

    // ===== Inspectors =====

    /// Current playback snapshot
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Lifecycle stage
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Loaded story
    pub fn current_story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Token of the current player
    pub fn token(&self) -> LoadToken {
        self.token
    }

    /// Last recorded failure
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    /// Forget the last failure
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Current player volume
    pub fn volume(&self) -> f32 {
        self.backend.volume()
    }

    /// Timing configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current time according to the session clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Session clock
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Everything an observer needs, in one value
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            status: self.status,
            story: self.story.clone(),
            volume: self.backend.volume(),
            is_fading: self.is_fading(),
            up_next: self.up_next.len(),
            error: self.last_error.clone(),
        }
    }

    /// Flush progress, release the player and the audio session
    pub fn shutdown(&mut self) {
        self.teardown_player();
        self.state = self.state.with_playing(false);
        self.persist_state();
        self.audio_session.deactivate();
        info!("Session shut down");
    }

    pub(crate) fn record_error(&mut self, err: PlaybackError) {
        warn!(error = %err, "Playback error");
        self.last_error = Some(err);
    }

    // ===== Internals =====

    fn pause_transport(&mut self) {
        self.backend.pause();
        self.state = self.state.with_playing(false);
        if self.status == SessionStatus::Playing {
            self.status = SessionStatus::Paused;
        }
    }

    fn cancel_fade(&mut self) {
        if let Some(fade) = self.fade.take() {
            self.backend.set_volume(fade.original_volume());
            debug!(
                completed = fade.completed_steps(),
                "Fade-out cancelled, volume restored"
            );
        }
    }

    /// Release the current player, flushing the outgoing story's progress
    fn teardown_player(&mut self) {
        self.cancel_fade();
        if self.status.has_player() {
            if self.preferences.get().remember_playback_position
                && self.status != SessionStatus::Loading
            {
                self.persist_progress();
            }
            self.backend.unload();
        }
        self.status = SessionStatus::Unloaded;
        self.pending_restore = None;
        self.loading_since = None;
    }

    fn activate_audio_session(&mut self) {
        match self.audio_session.activate() {
            Ok(()) => {
                if matches!(self.last_error, Some(PlaybackError::SessionActivation(_))) {
                    self.last_error = None;
                }
                debug!("Audio session active");
            }
            Err(err) => {
                let err = match err {
                    PlaybackError::SessionActivation(_) => err,
                    other => PlaybackError::SessionActivation(other.to_string()),
                };
                self.record_error(err);
            }
        }
    }

    fn persist_progress(&mut self) {
        let Some(story) = self.story.as_mut() else {
            return;
        };
        if story.duration <= 0.0 {
            return;
        }
        let fraction = clamp_progress(self.state.current_time / story.duration);
        story.progress = Some(fraction);
        if let Err(err) = progress::save(self.store.as_ref(), &story.id, fraction) {
            warn!(error = %err, "Failed to save story progress");
        }
    }

    fn persist_state(&self) {
        if let Err(err) = playback_state::save(self.store.as_ref(), &self.state) {
            warn!(error = %err, "Failed to save playback state");
        }
    }
}

impl SleepTimerHost for SessionController {
    fn start_sleep_timer_with(&mut self, duration: Duration, action: ExpiryAction) -> Result<()> {
        SessionController::start_sleep_timer_with(self, duration, action)
    }

    fn cancel_sleep_timer(&mut self) -> Result<()> {
        SessionController::cancel_sleep_timer(self);
        Ok(())
    }

    fn sleep_timer_remaining(&self) -> Option<Duration> {
        SessionController::sleep_timer_remaining(self)
    }
}

fn default_expiry_action(preferences: &PreferencesStore) -> ExpiryAction {
    if preferences.get().fade_out_enabled {
        ExpiryAction::FadeOut
    } else {
        ExpiryAction::Pause
    }
}

/// Positive time left until `end`
pub(crate) fn remaining_until(end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Duration> {
    let left = end? - now;
    left.to_std().ok().filter(|d| !d.is_zero())
}
