//! Session Controller - owns the one engine session bound to a surface
//!
//! Coordinates:
//! - Teardown of the previous session before a new one is created
//! - Asynchronous, cancellable source loading
//! - Phase transitions and Track Registry snapshots
//! - Language selection against the Ready session
//!
//! A controller is created per surface. It keeps at most one session in its
//! slot; `bind` serialises on an async lock so the previous engine session is
//! fully destroyed before the next is created. Load settlements are applied
//! only if the slot still holds the session that started the load.

use crate::{
    config::validate_source,
    engine::{EngineSession, StreamingEngine},
    surface::{MediaSurface, Subscription},
    tracks::TrackRegistry,
    types::*,
    Error, LoadFailureKind, Result,
};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// How a load settled
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Source loaded; the registry snapshot taken at Ready time
    Ready(Arc<TrackRegistry>),
    /// Source failed to load; a new bind may be attempted
    Failed {
        kind: LoadFailureKind,
        message: String,
    },
    /// Session was destroyed or replaced before the load settled
    Abandoned,
}

impl LoadOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadOutcome::Ready(_))
    }

    /// Convert into the registry or the matching error
    pub fn into_result(self) -> Result<Arc<TrackRegistry>> {
        match self {
            LoadOutcome::Ready(tracks) => Ok(tracks),
            LoadOutcome::Failed { kind, message } => Err(Error::LoadFailure { kind, message }),
            LoadOutcome::Abandoned => Err(Error::TeardownDuringLoad),
        }
    }
}

/// The live session held by the controller
struct Slot {
    id: SessionId,
    source: Url,
    phase: SessionPhase,
    bound_at: DateTime<Utc>,
    engine_session: Arc<dyn EngineSession>,
    cancel: CancellationToken,
    tracks: Arc<TrackRegistry>,
    outcome_tx: watch::Sender<Option<LoadOutcome>>,
    /// Surface listeners scoped to this session
    subscriptions: Vec<Subscription>,
}

impl Slot {
    fn transition(&mut self, to: SessionPhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(Error::InvalidStateTransition {
                from: self.phase,
                to,
            });
        }
        info!(session_id = %self.id, from = %self.phase, to = %to, "Session phase transition");
        self.phase = to;
        Ok(())
    }
}

struct ControllerInner {
    engine: Arc<dyn StreamingEngine>,
    surface: Arc<dyn MediaSurface>,
    slot: Mutex<Option<Slot>>,
    /// Serialises bind sequences (teardown, create, load start)
    bind_lock: tokio::sync::Mutex<()>,
    phase_tx: watch::Sender<SessionPhase>,
    load_timeout: Option<Duration>,
    closed: AtomicBool,
}

impl ControllerInner {
    fn slot(&self) -> MutexGuard<'_, Option<Slot>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Synchronously detach the session `id` (or any session if `None`)
    ///
    /// Cancels its load, drops its surface subscriptions and marks it
    /// Destroyed. The engine session is returned for async release.
    fn detach(&self, id: Option<SessionId>) -> Option<Arc<dyn EngineSession>> {
        let mut guard = self.slot();
        if id.is_some_and(|id| guard.as_ref().map(|s| s.id) != Some(id)) {
            return None;
        }
        let mut slot = guard.take()?;
        drop(guard);

        slot.cancel.cancel();
        slot.subscriptions.clear();
        if slot.phase == SessionPhase::Loading {
            debug!(session_id = %slot.id, "Abandoning in-flight load");
            slot.outcome_tx.send_replace(Some(LoadOutcome::Abandoned));
        }
        // Destroyed is reachable from every live phase
        let _ = slot.transition(SessionPhase::Destroyed);
        self.phase_tx.send_replace(SessionPhase::Destroyed);

        Some(slot.engine_session)
    }

    async fn release(engine_session: Arc<dyn EngineSession>) {
        if let Err(err) = engine_session.destroy().await {
            warn!(error = %err, "Engine session destroy reported an error");
        }
    }

    /// Apply a load settlement if the session is still current and loading
    fn settle(&self, id: SessionId, outcome: LoadOutcome) {
        let mut guard = self.slot();
        let Some(slot) = guard.as_mut().filter(|s| s.id == id && s.phase == SessionPhase::Loading)
        else {
            debug!(session_id = %id, "Discarding settlement of abandoned load");
            return;
        };

        let phase = match &outcome {
            LoadOutcome::Ready(tracks) => {
                slot.tracks = tracks.clone();
                info!(
                    session_id = %id,
                    audio_tracks = tracks.audio_tracks().len(),
                    text_tracks = tracks.text_tracks().len(),
                    "Source loaded"
                );
                SessionPhase::Ready
            }
            LoadOutcome::Failed { kind, message } => {
                warn!(session_id = %id, source = %slot.source, kind = %kind, error = %message, "Source failed to load");
                SessionPhase::Failed
            }
            LoadOutcome::Abandoned => return,
        };

        if slot.transition(phase).is_ok() {
            slot.outcome_tx.send_replace(Some(outcome));
            self.phase_tx.send_replace(phase);
        }
    }

    /// Engine session and registry of `id`, if it is Ready
    fn ready_session(
        &self,
        id: SessionId,
        command: &'static str,
    ) -> Result<(Arc<dyn EngineSession>, Arc<TrackRegistry>)> {
        let guard = self.slot();
        match guard.as_ref().filter(|s| s.id == id) {
            Some(slot) if slot.phase == SessionPhase::Ready => {
                Ok((slot.engine_session.clone(), slot.tracks.clone()))
            }
            Some(slot) => Err(Error::CommandOnInvalidPhase {
                command,
                phase: slot.phase,
            }),
            None => Err(Error::CommandOnInvalidPhase {
                command,
                phase: SessionPhase::Destroyed,
            }),
        }
    }
}

/// Owns the engine session bound to one media surface
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

impl SessionController {
    /// Create a controller for `surface`
    pub fn new(
        engine: Arc<dyn StreamingEngine>,
        surface: Arc<dyn MediaSurface>,
        load_timeout: Option<Duration>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Uninitialized);
        Self {
            inner: Arc::new(ControllerInner {
                engine,
                surface,
                slot: Mutex::new(None),
                bind_lock: tokio::sync::Mutex::new(()),
                phase_tx,
                load_timeout,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Phase of the current (or most recent) session
    pub fn phase(&self) -> SessionPhase {
        *self.inner.phase_tx.borrow()
    }

    /// Subscribe to phase changes
    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.inner.phase_tx.subscribe()
    }

    /// Tracks of the Ready session; empty in every other phase
    pub fn tracks(&self) -> Arc<TrackRegistry> {
        match self.inner.slot().as_ref() {
            Some(slot) if slot.phase == SessionPhase::Ready => slot.tracks.clone(),
            _ => Arc::new(TrackRegistry::empty()),
        }
    }

    /// Snapshot of the session currently in the slot
    pub fn current(&self) -> Option<SessionInfo> {
        self.inner.slot().as_ref().map(|slot| SessionInfo {
            id: slot.id,
            source: slot.source.clone(),
            phase: slot.phase,
            bound_at: slot.bound_at,
        })
    }

    /// Whether `shutdown` has been called
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Bind a new session for `source` and start loading it
    ///
    /// Any session already in the slot is destroyed (and its engine session
    /// released) before the new engine session is created.
    #[instrument(skip(self, source), fields(source = %source))]
    pub async fn bind(&self, source: Url) -> Result<SessionHandle> {
        let inner = &self.inner;
        let _bind = inner.bind_lock.lock().await;

        if self.is_closed() {
            return Err(Error::SessionDestroyed);
        }
        if !inner.engine.is_supported() {
            return Err(Error::UnsupportedEnvironment(
                "streaming engine reports the environment as unsupported".into(),
            ));
        }
        validate_source(&source)?;

        if let Some(previous) = inner.detach(None) {
            ControllerInner::release(previous).await;
        }

        let engine_session = match inner.engine.create_session(inner.surface.clone()).await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "Engine refused to create a session");
                inner.phase_tx.send_replace(SessionPhase::Failed);
                return Err(Error::load_failure(&err));
            }
        };

        let id = SessionId::new();
        let cancel = CancellationToken::new();
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let mut slot = Slot {
            id,
            source: source.clone(),
            phase: SessionPhase::Uninitialized,
            bound_at: Utc::now(),
            engine_session: engine_session.clone(),
            cancel: cancel.clone(),
            tracks: Arc::new(TrackRegistry::empty()),
            outcome_tx,
            subscriptions: Vec::new(),
        };
        slot.transition(SessionPhase::Loading)?;

        // `closed` is checked under the slot lock: a concurrent shutdown either
        // sees this slot and detaches it, or is seen here
        let installed = {
            let mut guard = inner.slot();
            if self.is_closed() {
                false
            } else {
                *guard = Some(slot);
                inner.phase_tx.send_replace(SessionPhase::Loading);
                true
            }
        };
        if !installed {
            debug!("Controller closed while the engine session was being created");
            ControllerInner::release(engine_session).await;
            return Err(Error::SessionDestroyed);
        }

        info!(session_id = %id, source = %source, "Session bound, loading source");

        tokio::spawn(run_load(
            inner.clone(),
            id,
            engine_session,
            source.clone(),
            cancel,
        ));

        Ok(SessionHandle {
            id,
            source,
            inner: inner.clone(),
            outcome_rx,
        })
    }

    /// Destroy whatever session is bound; idempotent
    pub async fn destroy_current(&self) {
        if let Some(engine_session) = self.inner.detach(None) {
            ControllerInner::release(engine_session).await;
        }
    }

    /// Refuse further binds and destroy the current session
    ///
    /// The slot is detached synchronously, so no listener registered for the
    /// session fires once this returns its first poll.
    pub async fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.destroy_current().await;
    }

    /// Synchronous form of [`shutdown`](Self::shutdown) for drop paths
    ///
    /// The engine session is released on the current runtime, if there is one.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let Some(engine_session) = self.inner.detach(None) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(ControllerInner::release(engine_session));
            }
            Err(_) => warn!("No runtime to release the engine session on"),
        }
    }
}

/// Drive the engine load for session `id`, racing cancellation and timeout
async fn run_load(
    inner: Arc<ControllerInner>,
    id: SessionId,
    engine_session: Arc<dyn EngineSession>,
    source: Url,
    cancel: CancellationToken,
) {
    let load = async {
        let result = match inner.load_timeout {
            Some(limit) => match tokio::time::timeout(limit, engine_session.load(&source)).await {
                Ok(result) => result.map_err(|e| Error::load_failure(&e)),
                Err(_) => Err(Error::LoadFailure {
                    kind: LoadFailureKind::Timeout,
                    message: format!("load did not settle within {}ms", limit.as_millis()),
                }),
            },
            None => engine_session
                .load(&source)
                .await
                .map_err(|e| Error::load_failure(&e)),
        };

        match result {
            Ok(()) => LoadOutcome::Ready(Arc::new(TrackRegistry::from_renditions(
                &engine_session.variant_tracks(),
                &engine_session.text_tracks(),
            ))),
            Err(Error::LoadFailure { kind, message }) => LoadOutcome::Failed { kind, message },
            Err(other) => LoadOutcome::Failed {
                kind: LoadFailureKind::Unknown,
                message: other.to_string(),
            },
        }
    };

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(session_id = %id, "Load cancelled before settling");
            return;
        }
        outcome = load => outcome,
    };

    inner.settle(id, outcome);
}

/// Handle to one bound session
///
/// Cloning is cheap. Every handle refers to the session it was created for;
/// once that session is destroyed or replaced, commands through it report
/// `CommandOnInvalidPhase` and `phase()` reports Destroyed.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    source: Url,
    inner: Arc<ControllerInner>,
    outcome_rx: watch::Receiver<Option<LoadOutcome>>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn source(&self) -> &Url {
        &self.source
    }

    /// Phase of this session; Destroyed once it left the slot
    pub fn phase(&self) -> SessionPhase {
        match self.inner.slot().as_ref() {
            Some(slot) if slot.id == self.id => slot.phase,
            _ => SessionPhase::Destroyed,
        }
    }

    /// Whether this session is still the one in the controller's slot
    pub fn is_current(&self) -> bool {
        self.inner.slot().as_ref().is_some_and(|s| s.id == self.id)
    }

    /// Wait for the load to settle
    pub async fn load_outcome(&self) -> LoadOutcome {
        let mut rx = self.outcome_rx.clone();
        let settled = rx.wait_for(Option::is_some).await;
        match settled {
            Ok(outcome) => outcome.clone().unwrap_or(LoadOutcome::Abandoned),
            Err(_) => LoadOutcome::Abandoned,
        }
    }

    /// Tracks of this session; empty unless it is Ready
    pub fn tracks(&self) -> Arc<TrackRegistry> {
        match self.inner.slot().as_ref() {
            Some(slot) if slot.id == self.id && slot.phase == SessionPhase::Ready => {
                slot.tracks.clone()
            }
            _ => Arc::new(TrackRegistry::empty()),
        }
    }

    /// Keep surface subscriptions alive for as long as this session is bound
    ///
    /// Returns false (dropping the subscriptions) if the session is gone.
    pub fn retain(&self, subscriptions: Vec<Subscription>) -> bool {
        let mut guard = self.inner.slot();
        match guard.as_mut().filter(|s| s.id == self.id) {
            Some(slot) => {
                slot.subscriptions.extend(subscriptions);
                true
            }
            None => false,
        }
    }

    /// Select the first audio track whose language matches
    pub fn select_audio_track(&self, language: &str) -> Result<Track> {
        let (engine_session, tracks) = self.inner.ready_session(self.id, "select_audio_track")?;
        let track = tracks
            .find(TrackKind::Audio, language)
            .cloned()
            .ok_or_else(|| Error::TrackNotFound {
                kind: TrackKind::Audio,
                language: language.to_string(),
            })?;
        warn_if_ambiguous(&tracks, TrackKind::Audio, language);

        engine_session.select_audio_language(language)?;
        debug!(session_id = %self.id, track = %track.id, "Audio track selected");
        Ok(track)
    }

    /// Select a subtitle language, or turn subtitles off with `None`
    ///
    /// `"none"`, `"off"` and the empty string also turn subtitles off.
    pub fn select_text_track(&self, language: Option<&str>) -> Result<Option<Track>> {
        let (engine_session, tracks) = self.inner.ready_session(self.id, "select_text_track")?;

        let Some(language) = language.filter(|l| !is_subtitles_off(l)) else {
            engine_session.select_text_language(None)?;
            debug!(session_id = %self.id, "Subtitles disabled");
            return Ok(None);
        };

        let track = tracks
            .find(TrackKind::Text, language)
            .cloned()
            .ok_or_else(|| Error::TrackNotFound {
                kind: TrackKind::Text,
                language: language.to_string(),
            })?;
        warn_if_ambiguous(&tracks, TrackKind::Text, language);

        engine_session.select_text_language(Some(language))?;
        debug!(session_id = %self.id, track = %track.id, "Text track selected");
        Ok(Some(track))
    }

    /// Destroy this session; idempotent, cancels an in-flight load
    pub async fn destroy(&self) {
        if let Some(engine_session) = self.inner.detach(Some(self.id)) {
            info!(session_id = %self.id, "Session destroyed");
            ControllerInner::release(engine_session).await;
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("source", &self.source.as_str())
            .finish()
    }
}

fn is_subtitles_off(language: &str) -> bool {
    let language = language.trim();
    language.is_empty()
        || language.eq_ignore_ascii_case("none")
        || language.eq_ignore_ascii_case("off")
}

fn warn_if_ambiguous(tracks: &TrackRegistry, kind: TrackKind, language: &str) {
    if tracks
        .ambiguous_languages(kind)
        .iter()
        .any(|l| l.eq_ignore_ascii_case(language))
    {
        warn!(kind = %kind, language, "Several tracks share this language; using the first");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, EngineErrorCategory, EngineResult, TextInfo, VariantInfo};
    use crate::headless::{HeadlessSurface, ScriptedEngine, SourceScript};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Engine whose session creation waits for the gate to open
    struct GatedEngine {
        inner: ScriptedEngine,
        gate: Notify,
    }

    #[async_trait]
    impl StreamingEngine for GatedEngine {
        fn is_supported(&self) -> bool {
            true
        }

        async fn create_session(
            &self,
            surface: Arc<dyn MediaSurface>,
        ) -> EngineResult<Arc<dyn EngineSession>> {
            self.gate.notified().await;
            self.inner.create_session(surface).await
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn english_audio() -> Vec<VariantInfo> {
        vec![VariantInfo {
            id: "1".into(),
            language: Some("en".into()),
            label: Some("English".into()),
            has_audio: true,
            bandwidth: 2_000_000,
        }]
    }

    fn subtitles() -> Vec<TextInfo> {
        vec![TextInfo {
            id: "10".into(),
            language: Some("es".into()),
            label: Some("Español".into()),
            kind: "subtitles".into(),
        }]
    }

    fn controller(engine: &Arc<ScriptedEngine>) -> SessionController {
        SessionController::new(engine.clone(), Arc::new(HeadlessSurface::new()), None)
    }

    #[tokio::test]
    async fn test_bind_settles_ready() {
        let engine = Arc::new(ScriptedEngine::new());
        let source = url("https://cdn.example.com/a/master.m3u8");
        engine.script(&source, SourceScript::ready(english_audio(), subtitles()));

        let controller = controller(&engine);
        assert_eq!(controller.phase(), SessionPhase::Uninitialized);
        assert!(controller.tracks().is_empty());

        let handle = controller.bind(source).await.unwrap();
        let outcome = handle.load_outcome().await;
        assert!(outcome.is_ready());
        assert_eq!(handle.phase(), SessionPhase::Ready);
        assert_eq!(controller.tracks().audio_tracks().len(), 1);
        assert_eq!(controller.tracks().text_tracks().len(), 1);
    }

    #[tokio::test]
    async fn test_commands_before_ready_are_ignorable() {
        let engine = Arc::new(ScriptedEngine::new());
        let source = url("https://cdn.example.com/held.mpd");
        engine.script(&source, SourceScript::held(english_audio(), vec![]));

        let controller = controller(&engine);
        let handle = controller.bind(source).await.unwrap();
        assert_eq!(handle.phase(), SessionPhase::Loading);

        let err = handle.select_audio_track("en").unwrap_err();
        assert!(matches!(
            err,
            Error::CommandOnInvalidPhase {
                phase: SessionPhase::Loading,
                ..
            }
        ));
        assert!(err.is_ignorable());
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let engine = Arc::new(ScriptedEngine::new());
        let source = url("https://cdn.example.com/a/master.m3u8");
        engine.script(&source, SourceScript::ready(vec![], vec![]));

        let controller = controller(&engine);
        let handle = controller.bind(source).await.unwrap();
        handle.load_outcome().await;

        handle.destroy().await;
        handle.destroy().await;
        handle.destroy().await;

        assert_eq!(engine.sessions_destroyed(), 1);
        assert_eq!(handle.phase(), SessionPhase::Destroyed);
        assert_eq!(controller.phase(), SessionPhase::Destroyed);
        assert!(controller.current().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_classified() {
        let engine = Arc::new(ScriptedEngine::new());
        let source = url("https://cdn.example.com/broken.m3u8");
        engine.script(
            &source,
            SourceScript::failing(EngineError::new(
                EngineErrorCategory::Manifest,
                4000,
                "unable to guess manifest type",
            )),
        );

        let controller = controller(&engine);
        let handle = controller.bind(source).await.unwrap();
        match handle.load_outcome().await {
            LoadOutcome::Failed { kind, .. } => assert_eq!(kind, LoadFailureKind::Manifest),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(controller.phase(), SessionPhase::Failed);
        assert!(controller.tracks().is_empty());
    }

    #[tokio::test]
    async fn test_load_timeout() {
        let engine = Arc::new(ScriptedEngine::new());
        let source = url("https://cdn.example.com/slow.m3u8");
        engine.script(&source, SourceScript::held(vec![], vec![]));

        let controller = SessionController::new(
            engine.clone(),
            Arc::new(HeadlessSurface::new()),
            Some(Duration::from_millis(20)),
        );
        let handle = controller.bind(source).await.unwrap();
        let err = handle.load_outcome().await.into_result().unwrap_err();
        assert!(matches!(
            err,
            Error::LoadFailure {
                kind: LoadFailureKind::Timeout,
                ..
            }
        ));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_shutdown_refuses_bind() {
        let engine = Arc::new(ScriptedEngine::new());
        let controller = controller(&engine);
        controller.shutdown().await;
        assert!(matches!(
            controller.bind(url("https://cdn.example.com/a.m3u8")).await,
            Err(Error::SessionDestroyed)
        ));
        assert_eq!(engine.sessions_created(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_while_creating_session() {
        let engine = Arc::new(GatedEngine {
            inner: ScriptedEngine::new(),
            gate: Notify::new(),
        });
        let source = url("https://cdn.example.com/a/master.m3u8");
        engine.inner.script(&source, SourceScript::ready(english_audio(), vec![]));
        let controller =
            SessionController::new(engine.clone(), Arc::new(HeadlessSurface::new()), None);

        let (bound, ()) = tokio::join!(controller.bind(source), async {
            tokio::task::yield_now().await;
            controller.shutdown().await;
            engine.gate.notify_one();
        });

        assert!(matches!(bound, Err(Error::SessionDestroyed)));
        assert!(controller.current().is_none());
        assert_eq!(engine.inner.sessions_created(), 1);
        assert_eq!(engine.inner.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_close_releases_without_awaiting() {
        let engine = Arc::new(ScriptedEngine::new());
        let source = url("https://cdn.example.com/held.mpd");
        engine.script(&source, SourceScript::held(english_audio(), vec![]));

        let controller = controller(&engine);
        let handle = controller.bind(source).await.unwrap();
        controller.close();

        assert_eq!(handle.phase(), SessionPhase::Destroyed);
        assert_eq!(handle.load_outcome().await, LoadOutcome::Abandoned);
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert_eq!(engine.live_sessions(), 0);
        assert!(controller.is_closed());
    }

    #[test]
    fn test_subtitles_off_aliases() {
        assert!(is_subtitles_off("none"));
        assert!(is_subtitles_off(" OFF "));
        assert!(is_subtitles_off(""));
        assert!(!is_subtitles_off("en"));
    }
}
