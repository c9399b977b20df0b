/// Running application state
use crate::config::HostConfig;
use crate::error::Result;
use dreams_core::{KeyValueStore, Story};
use dreams_playback::{
    spawn_session, AudioSession, MediaBackend, SessionContext, SessionController, SessionHandle,
    TimerController, TokioClock,
};
use dreams_storage::{FileStore, PreferencesStore, StoryLibrary};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Everything an embedding shell needs once the core is started
pub struct AppState {
    pub store: Arc<FileStore>,
    pub preferences: Arc<PreferencesStore>,
    pub session: SessionHandle,
    pub timers: TimerController,
    task: JoinHandle<()>,
}

impl AppState {
    /// Open the store, load preferences and start the session task
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: &HostConfig,
        backend: Box<dyn MediaBackend>,
        audio_session: Box<dyn AudioSession>,
    ) -> Result<Self> {
        let store = Arc::new(FileStore::open(&config.storage.state_file)?);
        let shared: Arc<dyn KeyValueStore> = store.clone();
        let preferences = Arc::new(PreferencesStore::load_or_default(Arc::clone(&shared)));

        let controller = SessionController::new(SessionContext {
            backend,
            audio_session,
            preferences: Arc::clone(&preferences),
            store: shared,
            clock: Arc::new(TokioClock::new()),
            config: config.to_session_config(),
        });
        let (session, task) = spawn_session(controller);
        let timers = TimerController::new(Arc::clone(&preferences));

        info!(
            state_file = %store.path().display(),
            "History Dreams core started"
        );

        Ok(Self {
            store,
            preferences,
            session,
            timers,
            task,
        })
    }

    /// Build a library with every story's saved progress applied
    pub fn library(&self, stories: impl IntoIterator<Item = Story>) -> StoryLibrary {
        let mut library = StoryLibrary::with_stories(stories);
        library.apply_saved_progress(self.store.as_ref());
        library
    }

    /// Stop the session task and wait for it to flush
    pub async fn shutdown(self) -> Result<()> {
        // Already stopped when every other handle is gone
        let _ = self.session.shutdown();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Session task ended abnormally");
        }
        info!("History Dreams core stopped");
        Ok(())
    }
}
