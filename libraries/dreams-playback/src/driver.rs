//! Tokio driver for a [`SessionController`]
//!
//! [`spawn_session`] moves the controller into a task that owns it
//! exclusively. User commands, player notifications, platform events, the
//! progress interval, the timer interval and the next fade step are all
//! serialized by one `select!` loop, and a fresh [`SessionSnapshot`] is
//! published on a `watch` channel after every input that changed something.
//!
//! # Example
//!
//! ```rust,ignore
//! let (handle, task) = spawn_session(controller);
//!
//! handle.load_story(story)?;
//! handle.play()?;
//!
//! let mut updates = handle.subscribe();
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow().clone();
//!     render(&snapshot);
//! }
//! ```

use crate::{
    backend::MediaEvent,
    error::{PlaybackError, Result},
    events::SystemEvent,
    session::{remaining_until, SessionController},
    timer::SleepTimerHost,
    types::{ExpiryAction, SessionSnapshot},
};
use chrono::{DateTime, Utc};
use dreams_core::{Clock, Story};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Clock that follows tokio's time source
///
/// Anchored to wall-clock time at creation and advanced with
/// [`tokio::time::Instant`], so a paused test runtime moves it too.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: Instant,
    origin_time: DateTime<Utc>,
}

impl TokioClock {
    /// Create a clock starting at the current wall-clock time
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            origin_time: Utc::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin_time + elapsed
    }
}

/// Input for the session task
#[derive(Debug)]
enum Command {
    LoadStory(Story),
    LoadLocator(String),
    Play,
    Pause,
    TogglePlayback,
    Seek(f64),
    StartSleepTimer {
        duration: Duration,
        action: Option<ExpiryAction>,
    },
    CancelSleepTimer,
    FadeOutAndStop {
        duration: Duration,
        steps: Option<u32>,
    },
    Enqueue(Story),
    ClearQueue,
    ApplyPreferences,
    ClearError,
    Shutdown,
}

/// Cloneable front door to a running session
///
/// Every method only queues its input and returns immediately. The effect
/// is visible in [`SessionHandle::snapshot`] once the task has processed it.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    media: mpsc::UnboundedSender<MediaEvent>,
    system: mpsc::UnboundedSender<SystemEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("closed", &self.commands.is_closed())
            .finish_non_exhaustive()
    }
}

/// Run `controller` on its own task
///
/// The task ends when [`SessionHandle::shutdown`] is called or every handle
/// has been dropped. The controller is shut down before the task returns.
pub fn spawn_session(controller: SessionController) -> (SessionHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (media_tx, media_rx) = mpsc::unbounded_channel();
    let (system_tx, system_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

    let handle = SessionHandle {
        commands: command_tx,
        media: media_tx,
        system: system_tx,
        snapshots: snapshot_rx,
        clock: controller.clock(),
    };

    let task = tokio::spawn(run(controller, command_rx, media_rx, system_rx, snapshot_tx));
    (handle, task)
}

async fn run(
    mut controller: SessionController,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut media: mpsc::UnboundedReceiver<MediaEvent>,
    mut system: mpsc::UnboundedReceiver<SystemEvent>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    let mut progress = tokio::time::interval(controller.config().progress_interval);
    progress.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut timer = tokio::time::interval(controller.config().timer_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Session task started");

    loop {
        let fade_delay = controller.next_fade_deadline().map(|deadline| {
            (deadline - controller.now())
                .to_std()
                .unwrap_or(Duration::ZERO)
        });

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply(&mut controller, command),
            },
            Some(event) = media.recv() => controller.on_media_event(event),
            Some(event) = system.recv() => controller.on_system_event(event),
            _ = progress.tick() => controller.on_progress_tick(),
            _ = timer.tick() => controller.on_timer_tick(),
            () = tokio::time::sleep(fade_delay.unwrap_or(Duration::ZERO)), if fade_delay.is_some() => {
                controller.on_fade_tick();
            }
        }

        publish(&snapshots, controller.snapshot());
    }

    controller.shutdown();
    publish(&snapshots, controller.snapshot());
    info!("Session task stopped");
}

fn apply(controller: &mut SessionController, command: Command) {
    debug!(?command, "Session command");
    let outcome = match command {
        Command::LoadStory(story) => {
            controller.load_story(story);
            Ok(())
        }
        Command::LoadLocator(locator) => {
            controller.load_locator(locator);
            Ok(())
        }
        Command::Play => {
            controller.play();
            Ok(())
        }
        Command::Pause => {
            controller.pause();
            Ok(())
        }
        Command::TogglePlayback => {
            controller.toggle_playback();
            Ok(())
        }
        Command::Seek(progress) => {
            controller.seek(progress);
            Ok(())
        }
        Command::StartSleepTimer { duration, action } => match action {
            Some(action) => controller.start_sleep_timer_with(duration, action),
            None => controller.start_sleep_timer(duration),
        },
        Command::CancelSleepTimer => {
            controller.cancel_sleep_timer();
            Ok(())
        }
        Command::FadeOutAndStop { duration, steps } => match steps {
            Some(steps) => controller.fade_out_and_stop_with_steps(duration, steps),
            None => controller.fade_out_and_stop(duration),
        },
        Command::Enqueue(story) => {
            controller.enqueue(story);
            Ok(())
        }
        Command::ClearQueue => {
            controller.clear_queue();
            Ok(())
        }
        Command::ApplyPreferences => {
            controller.apply_preferences();
            Ok(())
        }
        Command::ClearError => {
            controller.clear_error();
            Ok(())
        }
        // Handled by the loop
        Command::Shutdown => Ok(()),
    };

    if let Err(err) = outcome {
        controller.record_error(err);
    }
}

fn publish(snapshots: &watch::Sender<SessionSnapshot>, next: SessionSnapshot) {
    snapshots.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

impl SessionHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::ChannelClosed)
    }

    /// Make `story` the active story
    pub fn load_story(&self, story: Story) -> Result<()> {
        self.send(Command::LoadStory(story))
    }

    /// Load a bare locator as a placeholder story
    pub fn load_locator(&self, locator: impl Into<String>) -> Result<()> {
        self.send(Command::LoadLocator(locator.into()))
    }

    pub fn play(&self) -> Result<()> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn toggle_playback(&self) -> Result<()> {
        self.send(Command::TogglePlayback)
    }

    /// Jump to a fraction of the story
    pub fn seek(&self, progress: f64) -> Result<()> {
        self.send(Command::Seek(progress))
    }

    /// Start the sleep timer with the action chosen by the preferences
    pub fn start_sleep_timer(&self, duration: Duration) -> Result<()> {
        self.send(Command::StartSleepTimer {
            duration,
            action: None,
        })
    }

    /// Start the sleep timer with an explicit expiry action
    pub fn start_sleep_timer_with(&self, duration: Duration, action: ExpiryAction) -> Result<()> {
        self.send(Command::StartSleepTimer {
            duration,
            action: Some(action),
        })
    }

    pub fn cancel_sleep_timer(&self) -> Result<()> {
        self.send(Command::CancelSleepTimer)
    }

    /// Fade out with the configured number of steps, then pause
    pub fn fade_out_and_stop(&self, duration: Duration) -> Result<()> {
        self.send(Command::FadeOutAndStop {
            duration,
            steps: None,
        })
    }

    /// Fade out in `steps` volume steps, then pause
    pub fn fade_out_and_stop_with_steps(&self, duration: Duration, steps: u32) -> Result<()> {
        self.send(Command::FadeOutAndStop {
            duration,
            steps: Some(steps),
        })
    }

    /// Queue a story for autoplay
    pub fn enqueue(&self, story: Story) -> Result<()> {
        self.send(Command::Enqueue(story))
    }

    pub fn clear_queue(&self) -> Result<()> {
        self.send(Command::ClearQueue)
    }

    /// Re-read volume and speed from the preferences
    pub fn apply_preferences(&self) -> Result<()> {
        self.send(Command::ApplyPreferences)
    }

    pub fn clear_error(&self) -> Result<()> {
        self.send(Command::ClearError)
    }

    /// Stop the session task
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// Forward a player notification
    pub fn send_media_event(&self, event: MediaEvent) -> Result<()> {
        self.media
            .send(event)
            .map_err(|_| PlaybackError::ChannelClosed)
    }

    /// Sender for player notifications, for hosts that wire their backend
    /// callbacks directly
    pub fn media_sender(&self) -> mpsc::UnboundedSender<MediaEvent> {
        self.media.clone()
    }

    /// Forward a platform event
    pub fn send_system_event(&self, event: SystemEvent) -> Result<()> {
        self.system
            .send(event)
            .map_err(|_| PlaybackError::ChannelClosed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Whether the session task has stopped
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

impl SleepTimerHost for SessionHandle {
    fn start_sleep_timer_with(&mut self, duration: Duration, action: ExpiryAction) -> Result<()> {
        SessionHandle::start_sleep_timer_with(self, duration, action)
    }

    fn cancel_sleep_timer(&mut self) -> Result<()> {
        SessionHandle::cancel_sleep_timer(self)
    }

    fn sleep_timer_remaining(&self) -> Option<Duration> {
        let end = self.snapshots.borrow().state.sleep_timer_end;
        remaining_until(end, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_paused_time() {
        let clock = TokioClock::new();
        let start = clock.now();

        tokio::time::sleep(Duration::from_secs(90)).await;

        let elapsed = clock.now() - start;
        assert!(elapsed >= chrono::Duration::seconds(90));
        assert!(elapsed < chrono::Duration::seconds(91));
    }
}
