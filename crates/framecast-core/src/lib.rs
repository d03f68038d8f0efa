//! Framecast Core - Playback session lifecycle for embedded video players
//!
//! This crate owns the relationship between a media surface (the element
//! that decodes and renders), the adaptive-streaming session bound to it,
//! and the playback state the controls render:
//! - Session binding, cancellable loading and teardown
//! - Track registry snapshots and language selection
//! - Playback state reconciled from surface events
//! - Control commands and the controls render model
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Framecast Core                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │                    ┌──────────────┐                             │
//! │                    │   Control    │                             │
//! │                    │   Surface    │                             │
//! │                    └──────┬───────┘                             │
//! │                           │ commands                            │
//! │                    ┌──────┴───────┐                             │
//! │                    │ VideoPlayer  │                             │
//! │                    └──┬────────┬──┘                             │
//! │                       │        │                                │
//! │  ┌──────────────┐  ┌──┴─────┐ ┌┴─────────────┐                  │
//! │  │    Track     │◄─┤Session │ │   Playback   │◄── surface       │
//! │  │   Registry   │  │Control.│ │ State Store  │    events        │
//! │  └──────────────┘  └──┬─────┘ └──────┬───────┘                  │
//! │                       │              │                          │
//! │              ┌────────┴───┐   ┌──────┴───────┐                  │
//! │              │ Streaming  │   │    Media     │                  │
//! │              │  Engine    │──►│   Surface    │                  │
//! │              └────────────┘   └──────────────┘                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod controls;
pub mod engine;
pub mod error;
pub mod headless;
pub mod player;
pub mod session;
pub mod state;
pub mod surface;
pub mod tracks;
pub mod types;

pub use config::PlayerConfig;
pub use controls::{ControlSurface, ControlsView, TrackOption};
pub use engine::{EngineError, EngineErrorCategory, EngineSession, StreamingEngine};
pub use error::{Error, LoadFailureKind, Notice, Result};
pub use player::VideoPlayer;
pub use session::{LoadOutcome, SessionController, SessionHandle};
pub use state::PlaybackStore;
pub use surface::{MediaSurface, Subscription, SurfaceEvent};
pub use tracks::TrackRegistry;
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Framecast Core initialized");
}
