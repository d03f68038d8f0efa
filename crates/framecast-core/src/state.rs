//! Playback State Store
//!
//! Single writer of the UI-observable playback fields. The store updates them
//! from surface events (position at the surface's own cadence, duration on
//! metadata) and from the commands it forwards to the surface. Optimistic
//! writes such as `is_playing` after a play request are reconciled against
//! the surface's paused flag on the next play/pause/timeupdate event.

use crate::surface::{MediaSurface, Subscription, SurfaceEvent};
use crate::types::{clamp_position, clamp_volume, PlaybackState, Track};
use crate::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

struct StoreInner {
    surface: Arc<dyn MediaSurface>,
    state_tx: watch::Sender<PlaybackState>,
    /// Bumped on reset/detach; async commands drop their follow-up writes if it moved
    epoch: AtomicU64,
}

/// Holds and mutates the observable playback state for one surface
#[derive(Clone)]
pub struct PlaybackStore {
    inner: Arc<StoreInner>,
}

impl PlaybackStore {
    /// Create a store seeded with the surface's current volume
    pub fn new(surface: Arc<dyn MediaSurface>) -> Self {
        let initial = PlaybackState {
            volume: clamp_volume(surface.volume()),
            muted: surface.is_muted(),
            ..Default::default()
        };
        let (state_tx, _) = watch::channel(initial);

        Self {
            inner: Arc::new(StoreInner {
                surface,
                state_tx,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> PlaybackState {
        self.inner.state_tx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.inner.state_tx.subscribe()
    }

    /// Register the store's surface listeners
    ///
    /// Returns one guard per event class; the owner keeps them for exactly as
    /// long as the current session is bound.
    pub fn attach(&self) -> Vec<Subscription> {
        let position = {
            let store = self.clone();
            Subscription::acquire(&self.inner.surface, move |event| {
                if matches!(event, SurfaceEvent::TimeUpdate { .. }) {
                    store.apply_event(event);
                }
            })
        };
        let metadata = {
            let store = self.clone();
            Subscription::acquire(&self.inner.surface, move |event| {
                if matches!(
                    event,
                    SurfaceEvent::LoadedMetadata { .. } | SurfaceEvent::DurationChange { .. }
                ) {
                    store.apply_event(event);
                }
            })
        };
        let transport = {
            let store = self.clone();
            Subscription::acquire(&self.inner.surface, move |event| {
                if matches!(
                    event,
                    SurfaceEvent::Play
                        | SurfaceEvent::Pause
                        | SurfaceEvent::Ended
                        | SurfaceEvent::VolumeChange { .. }
                ) {
                    store.apply_event(event);
                }
            })
        };

        vec![position, metadata, transport]
    }

    /// Fold a surface event into the state
    pub fn apply_event(&self, event: &SurfaceEvent) {
        let surface = &self.inner.surface;
        self.inner.state_tx.send_if_modified(|state| {
            let before = state.clone();
            match *event {
                SurfaceEvent::TimeUpdate { current_time } => {
                    state.current_time = clamp_position(current_time, state.duration);
                    state.is_playing = !surface.is_paused();
                }
                SurfaceEvent::LoadedMetadata { duration }
                | SurfaceEvent::DurationChange { duration } => {
                    state.duration = (duration.is_finite() && duration >= 0.0).then_some(duration);
                    state.current_time = clamp_position(state.current_time, state.duration);
                }
                SurfaceEvent::Play | SurfaceEvent::Pause => {
                    state.is_playing = !surface.is_paused();
                }
                SurfaceEvent::Ended => {
                    state.is_playing = false;
                }
                SurfaceEvent::VolumeChange { volume, muted } => {
                    state.volume = clamp_volume(volume);
                    state.muted = muted;
                }
            }
            *state != before
        });
    }

    /// Correct `is_playing` from the surface's authoritative paused flag
    pub fn reconcile(&self) {
        let playing = !self.inner.surface.is_paused();
        self.inner.state_tx.send_if_modified(|state| {
            if state.is_playing != playing {
                debug!(is_playing = playing, "Reconciled play state from surface");
                state.is_playing = playing;
                true
            } else {
                false
            }
        });
    }

    /// Play if the surface is paused, otherwise pause
    ///
    /// Returns the new optimistic `is_playing`. A rejected play request is
    /// reconciled from the surface before the error is returned.
    pub async fn toggle_play(&self) -> Result<bool> {
        if self.inner.surface.is_paused() {
            self.play().await.map(|()| true)
        } else {
            self.pause();
            Ok(false)
        }
    }

    /// Request playback, optimistically marking the state as playing
    pub async fn play(&self) -> Result<()> {
        let epoch = self.inner.epoch.load(Ordering::Acquire);
        self.inner.state_tx.send_modify(|state| state.is_playing = true);

        if let Err(err) = self.inner.surface.play().await {
            if self.inner.epoch.load(Ordering::Acquire) == epoch {
                warn!(error = %err, "Play request rejected");
                self.reconcile();
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn pause(&self) {
        self.inner.surface.pause();
        self.inner.state_tx.send_modify(|state| state.is_playing = false);
    }

    /// Seek, clamped to [0, duration] (or to >= 0 while the duration is unknown)
    ///
    /// The surface is written before the state so that a surface dispatching
    /// its events synchronously never re-enters a held state lock.
    pub fn seek(&self, time: f64) -> f64 {
        let target = clamp_position(time, self.inner.state_tx.borrow().duration);
        self.inner.surface.set_current_time(target);
        self.inner.state_tx.send_modify(|state| state.current_time = target);
        debug!(requested = time, to = target, "Seek");
        target
    }

    /// Set volume on the surface, then on the state
    pub fn set_volume(&self, volume: f64) -> f64 {
        let clamped = clamp_volume(volume);
        self.inner.surface.set_volume(clamped);
        self.inner.state_tx.send_if_modified(|state| {
            let changed = state.volume != clamped;
            state.volume = clamped;
            changed
        });
        clamped
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.surface.set_muted(muted);
        self.inner.state_tx.send_if_modified(|state| {
            let changed = state.muted != muted;
            state.muted = muted;
            changed
        });
    }

    /// Flip mute; returns the new flag
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.state().muted;
        self.set_muted(muted);
        muted
    }

    /// Enter or leave fullscreen; failures are logged and otherwise ignored
    pub async fn toggle_fullscreen(&self) {
        let surface = &self.inner.surface;
        let result = if surface.is_fullscreen() {
            surface.exit_fullscreen().await
        } else {
            surface.request_fullscreen().await
        };
        if let Err(err) = result {
            debug!(error = %err, "Fullscreen request rejected");
        }
    }

    pub(crate) fn set_selected_audio(&self, track: Option<Track>) {
        self.inner
            .state_tx
            .send_if_modified(|state| replace_if_changed(&mut state.selected_audio_track, track));
    }

    pub(crate) fn set_selected_text(&self, track: Option<Track>) {
        self.inner
            .state_tx
            .send_if_modified(|state| replace_if_changed(&mut state.selected_text_track, track));
    }

    /// Reset per-source fields; volume and mute belong to the surface and survive
    pub fn reset_for_new_source(&self) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.inner.state_tx.send_modify(|state| {
            *state = PlaybackState {
                volume: state.volume,
                muted: state.muted,
                ..Default::default()
            };
        });
    }

    /// Invalidate in-flight command follow-ups (called on teardown)
    pub fn detach(&self) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
    }
}

fn replace_if_changed(slot: &mut Option<Track>, track: Option<Track>) -> bool {
    if *slot == track {
        false
    } else {
        *slot = track;
        true
    }
}
