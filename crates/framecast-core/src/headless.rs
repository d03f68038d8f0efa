//! In-memory surface and engine
//!
//! `HeadlessSurface` keeps the state a `<video>` element would and dispatches
//! events when told to via [`HeadlessSurface::emit`], or synchronously from
//! its setters once [`HeadlessSurface::echo_changes`] is on. `ScriptedEngine`
//! answers loads from a per-source script, including loads that stay pending
//! until released. Both are used by non-browser hosts and by the test suite.

use crate::engine::{
    EngineError, EngineErrorCategory, EngineResult, EngineSession, StreamingEngine, TextInfo,
    VariantInfo,
};
use crate::surface::{ListenerId, MediaSurface, SurfaceEvent, SurfaceListener};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;
use url::Url;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
struct SurfaceState {
    paused: bool,
    current_time: f64,
    duration: Option<f64>,
    volume: f64,
    muted: bool,
    fullscreen: bool,
    reject_play: bool,
    reject_fullscreen: bool,
    echo_changes: bool,
    play_requests: usize,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            paused: true,
            current_time: 0.0,
            duration: None,
            volume: 1.0,
            muted: false,
            fullscreen: false,
            reject_play: false,
            reject_fullscreen: false,
            echo_changes: false,
            play_requests: 0,
        }
    }
}

/// Media surface without a renderer
#[derive(Default)]
pub struct HeadlessSurface {
    state: Mutex<SurfaceState>,
    listeners: Mutex<Vec<(ListenerId, SurfaceListener)>>,
    next_listener: AtomicU64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch an event to every registered listener
    pub fn emit(&self, event: SurfaceEvent) {
        // Listeners may call back into the surface
        let listeners: Vec<SurfaceListener> =
            lock(&self.listeners).iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Set duration and emit `loadedmetadata`
    pub fn load_metadata(&self, duration: f64) {
        lock(&self.state).duration = Some(duration);
        self.emit(SurfaceEvent::LoadedMetadata { duration });
    }

    /// Move the playhead and emit `timeupdate`
    pub fn advance_to(&self, current_time: f64) {
        lock(&self.state).current_time = current_time;
        self.emit(SurfaceEvent::TimeUpdate { current_time });
    }

    /// Force the paused flag, as when the user agent pauses on its own
    pub fn set_paused(&self, paused: bool) {
        lock(&self.state).paused = paused;
    }

    /// Make subsequent `play()` calls fail
    pub fn reject_play(&self, reject: bool) {
        lock(&self.state).reject_play = reject;
    }

    /// Make subsequent fullscreen requests fail
    pub fn reject_fullscreen(&self, reject: bool) {
        lock(&self.state).reject_fullscreen = reject;
    }

    /// Emit `volumechange` / `timeupdate` from inside the property setters,
    /// the way some user agents dispatch them
    pub fn echo_changes(&self, echo: bool) {
        lock(&self.state).echo_changes = echo;
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn play_requests(&self) -> usize {
        lock(&self.state).play_requests
    }
}

#[async_trait]
impl MediaSurface for HeadlessSurface {
    async fn play(&self) -> Result<()> {
        let mut state = lock(&self.state);
        state.play_requests += 1;
        if state.reject_play {
            return Err(Error::surface("play() request was rejected"));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&self) {
        lock(&self.state).paused = true;
    }

    fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn current_time(&self) -> f64 {
        lock(&self.state).current_time
    }

    fn set_current_time(&self, seconds: f64) {
        let echo = {
            let mut state = lock(&self.state);
            state.current_time = seconds;
            state.echo_changes
        };
        if echo {
            self.emit(SurfaceEvent::TimeUpdate {
                current_time: seconds,
            });
        }
    }

    fn duration(&self) -> Option<f64> {
        lock(&self.state).duration
    }

    fn volume(&self) -> f64 {
        lock(&self.state).volume
    }

    fn set_volume(&self, volume: f64) {
        let echo = {
            let mut state = lock(&self.state);
            state.volume = volume;
            state.echo_changes.then_some(state.muted)
        };
        if let Some(muted) = echo {
            self.emit(SurfaceEvent::VolumeChange { volume, muted });
        }
    }

    fn is_muted(&self) -> bool {
        lock(&self.state).muted
    }

    fn set_muted(&self, muted: bool) {
        let echo = {
            let mut state = lock(&self.state);
            state.muted = muted;
            state.echo_changes.then_some(state.volume)
        };
        if let Some(volume) = echo {
            self.emit(SurfaceEvent::VolumeChange { volume, muted });
        }
    }

    fn is_fullscreen(&self) -> bool {
        lock(&self.state).fullscreen
    }

    async fn request_fullscreen(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.reject_fullscreen {
            return Err(Error::surface("fullscreen request denied"));
        }
        state.fullscreen = true;
        Ok(())
    }

    async fn exit_fullscreen(&self) -> Result<()> {
        lock(&self.state).fullscreen = false;
        Ok(())
    }

    fn add_listener(&self, listener: SurfaceListener) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        lock(&self.listeners).retain(|(lid, _)| *lid != id);
    }
}

/// How a scripted load settles
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Settle successfully right away
    Ready,
    /// Settle with this error right away
    Fail(EngineError),
    /// Stay pending until [`ScriptedEngine::release`] is called
    Hold,
}

/// Behaviour of one source locator
#[derive(Debug, Clone)]
pub struct SourceScript {
    pub outcome: ScriptedOutcome,
    pub variants: Vec<VariantInfo>,
    pub texts: Vec<TextInfo>,
}

impl SourceScript {
    pub fn ready(variants: Vec<VariantInfo>, texts: Vec<TextInfo>) -> Self {
        Self {
            outcome: ScriptedOutcome::Ready,
            variants,
            texts,
        }
    }

    pub fn failing(error: EngineError) -> Self {
        Self {
            outcome: ScriptedOutcome::Fail(error),
            variants: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn held(variants: Vec<VariantInfo>, texts: Vec<TextInfo>) -> Self {
        Self {
            outcome: ScriptedOutcome::Hold,
            variants,
            texts,
        }
    }
}

#[derive(Default)]
struct EngineStats {
    created: AtomicUsize,
    destroyed: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

/// Engine whose behaviour per source is scripted up front
pub struct ScriptedEngine {
    supported: AtomicBool,
    polyfills_installed: AtomicBool,
    refuse_sessions: AtomicBool,
    scripts: Mutex<HashMap<String, SourceScript>>,
    held: Arc<Mutex<HashMap<String, oneshot::Sender<EngineResult<()>>>>>,
    selections: Arc<Mutex<Vec<(String, Option<String>)>>>,
    stats: Arc<EngineStats>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self {
            supported: AtomicBool::new(true),
            polyfills_installed: AtomicBool::new(false),
            refuse_sessions: AtomicBool::new(false),
            scripts: Mutex::new(HashMap::new()),
            held: Arc::new(Mutex::new(HashMap::new())),
            selections: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(EngineStats::default()),
        }
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine for an environment without streaming support
    pub fn unsupported() -> Self {
        let engine = Self::default();
        engine.supported.store(false, Ordering::Relaxed);
        engine
    }

    /// Make `create_session` fail, as when the engine cannot attach to the surface
    pub fn refuse_sessions(&self, refuse: bool) {
        self.refuse_sessions.store(refuse, Ordering::Relaxed);
    }

    /// Script how loads of `source` behave
    pub fn script(&self, source: &Url, script: SourceScript) {
        lock(&self.scripts).insert(source.to_string(), script);
    }

    /// Settle a held load; returns false if nobody is waiting any more
    pub fn release(&self, source: &Url, outcome: EngineResult<()>) -> bool {
        match lock(&self.held).remove(source.as_str()) {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Whether a load of `source` is currently held open
    pub fn is_held(&self, source: &Url) -> bool {
        lock(&self.held)
            .get(source.as_str())
            .is_some_and(|tx| !tx.is_closed())
    }

    pub fn polyfills_installed(&self) -> bool {
        self.polyfills_installed.load(Ordering::Relaxed)
    }

    pub fn sessions_created(&self) -> usize {
        self.stats.created.load(Ordering::SeqCst)
    }

    pub fn sessions_destroyed(&self) -> usize {
        self.stats.destroyed.load(Ordering::SeqCst)
    }

    pub fn live_sessions(&self) -> usize {
        self.stats.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live sessions ever observed
    pub fn max_live_sessions(&self) -> usize {
        self.stats.max_live.load(Ordering::SeqCst)
    }

    /// Language selections in call order, as ("audio" | "text", language)
    pub fn selections(&self) -> Vec<(String, Option<String>)> {
        lock(&self.selections).clone()
    }
}

#[async_trait]
impl StreamingEngine for ScriptedEngine {
    fn install_polyfills(&self) {
        self.polyfills_installed.store(true, Ordering::Relaxed);
    }

    fn is_supported(&self) -> bool {
        self.supported.load(Ordering::Relaxed)
    }

    async fn create_session(
        &self,
        _surface: Arc<dyn MediaSurface>,
    ) -> EngineResult<Arc<dyn EngineSession>> {
        if self.refuse_sessions.load(Ordering::Relaxed) {
            return Err(EngineError::new(
                EngineErrorCategory::Network,
                1002,
                "could not attach to the media surface",
            ));
        }
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        let live = self.stats.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_live.fetch_max(live, Ordering::SeqCst);

        Ok(Arc::new(ScriptedSession {
            scripts: lock(&self.scripts).clone(),
            loaded: Mutex::new(None),
            held: self.held.clone(),
            selections: self.selections.clone(),
            stats: self.stats.clone(),
            destroyed: AtomicBool::new(false),
        }))
    }
}

struct ScriptedSession {
    scripts: HashMap<String, SourceScript>,
    loaded: Mutex<Option<SourceScript>>,
    held: Arc<Mutex<HashMap<String, oneshot::Sender<EngineResult<()>>>>>,
    selections: Arc<Mutex<Vec<(String, Option<String>)>>>,
    stats: Arc<EngineStats>,
    destroyed: AtomicBool,
}

impl ScriptedSession {
    fn ensure_alive(&self) -> EngineResult<()> {
        if self.destroyed.load(Ordering::SeqCst) {
            Err(EngineError::new(
                EngineErrorCategory::Player,
                7000,
                "operation on a destroyed player",
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EngineSession for ScriptedSession {
    async fn load(&self, source: &Url) -> EngineResult<()> {
        self.ensure_alive()?;
        let script = self.scripts.get(source.as_str()).cloned().ok_or_else(|| {
            EngineError::new(EngineErrorCategory::Network, 1001, format!("HTTP 404 for {}", source))
        })?;

        match &script.outcome {
            ScriptedOutcome::Ready => {}
            ScriptedOutcome::Fail(err) => return Err(err.clone()),
            ScriptedOutcome::Hold => {
                let (tx, rx) = oneshot::channel();
                lock(&self.held).insert(source.to_string(), tx);
                debug!(source = %source, "Scripted load held");
                rx.await.map_err(|_| {
                    EngineError::new(EngineErrorCategory::Player, 7000, "load interrupted")
                })??;
            }
        }

        *lock(&self.loaded) = Some(script);
        Ok(())
    }

    fn variant_tracks(&self) -> Vec<VariantInfo> {
        lock(&self.loaded)
            .as_ref()
            .map(|s| s.variants.clone())
            .unwrap_or_default()
    }

    fn text_tracks(&self) -> Vec<TextInfo> {
        lock(&self.loaded)
            .as_ref()
            .map(|s| s.texts.clone())
            .unwrap_or_default()
    }

    fn select_audio_language(&self, language: &str) -> EngineResult<()> {
        self.ensure_alive()?;
        lock(&self.selections).push(("audio".into(), Some(language.to_string())));
        Ok(())
    }

    fn select_text_language(&self, language: Option<&str>) -> EngineResult<()> {
        self.ensure_alive()?;
        lock(&self.selections).push(("text".into(), language.map(str::to_string)));
        Ok(())
    }

    async fn destroy(&self) -> EngineResult<()> {
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            self.stats.destroyed.fetch_add(1, Ordering::SeqCst);
            self.stats.live.fetch_sub(1, Ordering::SeqCst);
            *lock(&self.loaded) = None;
        }
        Ok(())
    }
}
