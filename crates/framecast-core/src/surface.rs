//! Media surface abstraction
//!
//! The surface is the passive decode/render sink (a `<video>` element in the
//! browser). It owns no session logic: it accepts play/pause/seek/volume
//! commands and emits lifecycle and position events to registered listeners.
//!
//! Listeners are only ever held through a [`Subscription`], which removes the
//! listener when dropped and stops delivery to it before removal completes.

use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Identifier handed out by [`MediaSurface::add_listener`]
pub type ListenerId = u64;

/// Callback invoked for every surface event
pub type SurfaceListener = Arc<dyn Fn(&SurfaceEvent) + Send + Sync>;

/// Events emitted by a media surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Position advanced, at the surface's native cadence
    TimeUpdate { current_time: f64 },
    /// Metadata is ready; fires once per loaded source
    LoadedMetadata { duration: f64 },
    /// Duration changed after metadata (live edge, late index)
    DurationChange { duration: f64 },
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Reached the end of the content
    Ended,
    /// Volume or mute changed
    VolumeChange { volume: f64, muted: bool },
}

impl SurfaceEvent {
    /// DOM event name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceEvent::TimeUpdate { .. } => "timeupdate",
            SurfaceEvent::LoadedMetadata { .. } => "loadedmetadata",
            SurfaceEvent::DurationChange { .. } => "durationchange",
            SurfaceEvent::Play => "play",
            SurfaceEvent::Pause => "pause",
            SurfaceEvent::Ended => "ended",
            SurfaceEvent::VolumeChange { .. } => "volumechange",
        }
    }
}

/// A decode/render sink the session binds to
///
/// Listeners may be invoked synchronously from inside the setters.
#[async_trait]
pub trait MediaSurface: Send + Sync {
    /// Start playback; may be rejected (autoplay policy, no data)
    async fn play(&self) -> Result<()>;

    fn pause(&self);

    /// Authoritative paused flag
    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&self, seconds: f64);

    /// Duration once metadata is loaded
    fn duration(&self) -> Option<f64>;

    fn volume(&self) -> f64;

    fn set_volume(&self, volume: f64);

    fn is_muted(&self) -> bool;

    fn set_muted(&self, muted: bool);

    fn is_fullscreen(&self) -> bool;

    async fn request_fullscreen(&self) -> Result<()>;

    async fn exit_fullscreen(&self) -> Result<()>;

    /// Register a listener for every subsequent event
    fn add_listener(&self, listener: SurfaceListener) -> ListenerId;

    /// Unregister a listener; unknown ids are ignored
    fn remove_listener(&self, id: ListenerId);
}

/// Scoped registration of a surface listener
///
/// Dropping the subscription marks it dead (so an event already being
/// dispatched is swallowed) and removes the listener from the surface.
pub struct Subscription {
    surface: Arc<dyn MediaSurface>,
    id: ListenerId,
    alive: Arc<AtomicBool>,
}

impl Subscription {
    /// Register `handler` on `surface` for the lifetime of the returned guard
    pub fn acquire<F>(surface: &Arc<dyn MediaSurface>, handler: F) -> Self
    where
        F: Fn(&SurfaceEvent) + Send + Sync + 'static,
    {
        let alive = Arc::new(AtomicBool::new(true));
        let gate = alive.clone();
        let id = surface.add_listener(Arc::new(move |event: &SurfaceEvent| {
            if gate.load(Ordering::Acquire) {
                handler(event);
            }
        }));
        trace!(listener = id, "Surface subscription acquired");

        Self {
            surface: surface.clone(),
            id,
            alive,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Release now instead of at scope end
    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
        self.surface.remove_listener(self.id);
        trace!(listener = self.id, "Surface subscription released");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
