//! Video player component
//!
//! The mounted unit a host embeds: one surface, one engine, one session
//! controller and one playback store. Source assignment rebinds the session,
//! unmount tears everything down, and surface commands are gated on the
//! session phase.

use crate::{
    config::{validate_source, PlayerConfig},
    controls::ControlSurface,
    engine::StreamingEngine,
    error::Notice,
    session::{LoadOutcome, SessionController, SessionHandle},
    state::PlaybackStore,
    surface::MediaSurface,
    tracks::TrackRegistry,
    types::*,
    Error, Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A mounted player bound to one media surface
pub struct VideoPlayer {
    engine: Arc<dyn StreamingEngine>,
    controller: SessionController,
    store: PlaybackStore,
    config: PlayerConfig,
    current: Mutex<Option<SessionHandle>>,
    /// Last source a bind was attempted for; survives a failed bind
    requested: Mutex<Option<Url>>,
    notice_tx: watch::Sender<Option<Notice>>,
    supported: bool,
    unmounted: AtomicBool,
}

impl VideoPlayer {
    /// Mount on `surface` and bind the configured source, if any
    ///
    /// Load failures and an unsupported environment do not fail the mount;
    /// they are reported through [`VideoPlayer::notice`].
    #[instrument(skip_all)]
    pub async fn mount(
        engine: Arc<dyn StreamingEngine>,
        surface: Arc<dyn MediaSurface>,
        config: PlayerConfig,
    ) -> Result<Self> {
        config.validate()?;

        if config.install_polyfills {
            engine.install_polyfills();
        }
        let supported = engine.is_supported();

        surface.set_volume(clamp_volume(config.initial_volume));
        surface.set_muted(config.muted);

        let controller =
            SessionController::new(engine.clone(), surface.clone(), config.load_timeout());
        let store = PlaybackStore::new(surface);
        let (notice_tx, _) = watch::channel(None);

        let player = Self {
            engine,
            controller,
            store,
            config,
            current: Mutex::new(None),
            requested: Mutex::new(None),
            notice_tx,
            supported,
            unmounted: AtomicBool::new(false),
        };

        if !supported {
            warn!("Streaming is not supported in this environment");
            player.notice_tx.send_replace(Some(Notice::UnsupportedEnvironment));
            return Ok(player);
        }

        info!(source = ?player.config.source.as_ref().map(Url::as_str), "Player mounted");
        if let Some(source) = player.config.source.clone() {
            if let Err(err) = player.bind(source).await {
                warn!(error = %err, "Initial source could not be bound");
            }
        }
        Ok(player)
    }

    fn current(&self) -> MutexGuard<'_, Option<SessionHandle>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn requested(&self) -> MutexGuard<'_, Option<Url>> {
        self.requested.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Assign a new source; the same locator again is a no-op
    ///
    /// Returns the handle of the new session, or `None` if nothing changed.
    pub async fn set_source(&self, source: Url) -> Result<Option<SessionHandle>> {
        if self.is_unmounted() {
            return Err(Error::SessionDestroyed);
        }

        let unchanged = self
            .current()
            .as_ref()
            .is_some_and(|h| h.source() == &source && h.phase() != SessionPhase::Destroyed);
        if unchanged {
            debug!(source = %source, "Source unchanged, keeping session");
            return Ok(None);
        }

        self.bind(source).await.map(Some)
    }

    /// Rebind the last requested source, e.g. after a transient failure
    ///
    /// Works after a failed load and after a bind the engine refused.
    pub async fn retry(&self) -> Result<Option<SessionHandle>> {
        let source = self.requested().clone();
        match source {
            Some(source) if !self.is_unmounted() => self.bind(source).await.map(Some),
            _ => Ok(None),
        }
    }

    async fn bind(&self, source: Url) -> Result<SessionHandle> {
        // Rejections that leave the current session untouched
        if !self.supported {
            return Err(Error::UnsupportedEnvironment(
                "streaming is not supported in this environment".into(),
            ));
        }
        validate_source(&source)?;
        *self.requested() = Some(source.clone());

        // Drop the old session's listeners before anything else can fire
        let previous = self.current().take();
        if let Some(previous) = previous {
            previous.destroy().await;
        }
        self.store.reset_for_new_source();
        self.notice_tx.send_replace(None);

        let handle = match self.controller.bind(source).await {
            Ok(handle) => handle,
            Err(err) => {
                if let Some(notice) = Notice::from_error(&err) {
                    self.notice_tx.send_replace(Some(notice));
                }
                return Err(err);
            }
        };
        handle.retain(self.store.attach());
        *self.current() = Some(handle.clone());

        tokio::spawn(after_load(
            handle.clone(),
            self.store.clone(),
            self.notice_tx.clone(),
            self.config.clone(),
        ));

        Ok(handle)
    }

    /// Tear down the session and release all surface listeners; idempotent
    #[instrument(skip(self))]
    pub async fn unmount(&self) {
        if self.unmounted.swap(true, Ordering::AcqRel) {
            return;
        }
        self.store.detach();
        let handle = self.current().take();
        if let Some(handle) = handle {
            handle.destroy().await;
        }
        self.controller.shutdown().await;
        info!("Player unmounted");
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::Acquire)
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn engine(&self) -> &Arc<dyn StreamingEngine> {
        &self.engine
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Handle of the current session
    pub fn session(&self) -> Option<SessionHandle> {
        self.current().clone()
    }

    pub fn source(&self) -> Option<Url> {
        self.current().as_ref().map(|h| h.source().clone())
    }

    pub fn phase(&self) -> SessionPhase {
        self.controller.phase()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.controller.subscribe_phase()
    }

    pub fn session_info(&self) -> Option<SessionInfo> {
        self.controller.current()
    }

    pub fn tracks(&self) -> Arc<TrackRegistry> {
        self.controller.tracks()
    }

    pub fn state(&self) -> PlaybackState {
        self.store.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.store.subscribe()
    }

    /// Latest user-visible notice, if any
    pub fn notice(&self) -> Option<Notice> {
        self.notice_tx.borrow().clone()
    }

    pub fn subscribe_notice(&self) -> watch::Receiver<Option<Notice>> {
        self.notice_tx.subscribe()
    }

    /// Command wrapper used by the rendered controls
    pub fn controls(&self) -> ControlSurface<'_> {
        ControlSurface::new(self)
    }

    /// Surface commands are accepted while a session is Loading or Ready
    fn require_live(&self, command: &'static str) -> Result<()> {
        let phase = self.phase();
        if phase.is_live() && !self.is_unmounted() {
            Ok(())
        } else {
            Err(Error::CommandOnInvalidPhase { command, phase })
        }
    }

    fn require_session(&self, command: &'static str) -> Result<SessionHandle> {
        self.session().ok_or(Error::CommandOnInvalidPhase {
            command,
            phase: self.phase(),
        })
    }

    pub async fn toggle_play(&self) -> Result<bool> {
        self.require_live("toggle_play")?;
        self.store.toggle_play().await
    }

    pub fn seek(&self, time: f64) -> Result<f64> {
        self.require_live("seek")?;
        Ok(self.store.seek(time))
    }

    pub fn set_volume(&self, volume: f64) -> Result<f64> {
        self.require_live("set_volume")?;
        Ok(self.store.set_volume(volume))
    }

    pub fn toggle_mute(&self) -> Result<bool> {
        self.require_live("toggle_mute")?;
        Ok(self.store.toggle_mute())
    }

    /// Best effort; a refused request only shows up in the logs
    pub async fn toggle_fullscreen(&self) {
        if !self.is_unmounted() {
            self.store.toggle_fullscreen().await;
        }
    }

    pub fn select_audio_track(&self, language: &str) -> Result<Track> {
        let track = self
            .require_session("select_audio_track")?
            .select_audio_track(language)?;
        self.store.set_selected_audio(Some(track.clone()));
        Ok(track)
    }

    /// `None` (or "none") turns subtitles off
    pub fn select_text_track(&self, language: Option<&str>) -> Result<Option<Track>> {
        let track = self
            .require_session("select_text_track")?
            .select_text_track(language)?;
        self.store.set_selected_text(track.clone());
        Ok(track)
    }
}

/// Follow-up once the load of `handle` settles: notices, preferences, autoplay
async fn after_load(
    handle: SessionHandle,
    store: PlaybackStore,
    notice_tx: watch::Sender<Option<Notice>>,
    config: PlayerConfig,
) {
    match handle.load_outcome().await {
        LoadOutcome::Ready(tracks) => {
            if !handle.is_current() {
                return;
            }
            if let Some(first) = tracks.audio_tracks().first() {
                store.set_selected_audio(Some(first.clone()));
            }
            if let Some(lang) = config.preferred_audio_language.as_deref() {
                match handle.select_audio_track(lang) {
                    Ok(track) => store.set_selected_audio(Some(track)),
                    Err(err) => debug!(error = %err, "Preferred audio language not applied"),
                }
            }
            if let Some(lang) = config.preferred_text_language.as_deref() {
                match handle.select_text_track(Some(lang)) {
                    Ok(track) => store.set_selected_text(track),
                    Err(err) => debug!(error = %err, "Preferred subtitle language not applied"),
                }
            }
            if config.autoplay && handle.is_current() && !store.state().is_playing {
                if let Err(err) = store.play().await {
                    warn!(error = %err, "Autoplay was blocked");
                }
            }
        }
        LoadOutcome::Failed { kind, message } => {
            if handle.is_current() {
                let err = Error::LoadFailure { kind, message };
                notice_tx.send_replace(Notice::from_error(&err));
            }
        }
        LoadOutcome::Abandoned => {
            debug!(session_id = %handle.id(), "Load abandoned before settling");
        }
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        if self.unmounted.swap(true, Ordering::AcqRel) {
            return;
        }
        self.store.detach();
        self.current().take();
        self.controller.close();
        debug!("Player dropped while mounted, session released");
    }
}

impl std::fmt::Debug for VideoPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPlayer")
            .field("source", &self.source().map(String::from))
            .field("phase", &self.phase())
            .field("unmounted", &self.is_unmounted())
            .finish()
    }
}
