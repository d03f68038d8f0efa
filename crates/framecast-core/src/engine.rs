//! Adaptive-streaming engine capability
//!
//! The engine fetches and decodes the manifest and feeds the surface. Framecast
//! treats it as opaque: it only creates sessions, loads sources, reads the
//! reported renditions, selects languages and destroys sessions.

use crate::surface::MediaSurface;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Error category reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineErrorCategory {
    Network,
    Text,
    Media,
    Manifest,
    Streaming,
    Drm,
    Player,
    Cast,
    Storage,
    Ads,
}

impl std::fmt::Display for EngineErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineErrorCategory::Network => "NETWORK",
            EngineErrorCategory::Text => "TEXT",
            EngineErrorCategory::Media => "MEDIA",
            EngineErrorCategory::Manifest => "MANIFEST",
            EngineErrorCategory::Streaming => "STREAMING",
            EngineErrorCategory::Drm => "DRM",
            EngineErrorCategory::Player => "PLAYER",
            EngineErrorCategory::Cast => "CAST",
            EngineErrorCategory::Storage => "STORAGE",
            EngineErrorCategory::Ads => "ADS",
        };
        f.write_str(name)
    }
}

/// Failure reported by the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{category} error {code}: {message}")]
pub struct EngineError {
    pub category: EngineErrorCategory,
    /// Engine-specific numeric code
    pub code: u32,
    pub message: String,
}

impl EngineError {
    pub fn new(category: EngineErrorCategory, code: u32, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }
}

/// Result of an engine call
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// A variant as reported by the engine (one per bitrate/language combination)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInfo {
    pub id: String,
    pub language: Option<String>,
    pub label: Option<String>,
    /// Variant carries an audio component
    pub has_audio: bool,
    pub bandwidth: u64,
}

/// A subtitle or caption stream as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInfo {
    pub id: String,
    pub language: Option<String>,
    pub label: Option<String>,
    /// "subtitles", "captions", ...
    pub kind: String,
}

/// Factory for engine sessions; one instance per host environment
#[async_trait]
pub trait StreamingEngine: Send + Sync {
    /// Patch missing environment features; called before the support check
    fn install_polyfills(&self) {}

    /// Whether the environment can decode and stream at all
    fn is_supported(&self) -> bool;

    /// Create a session attached to `surface`
    async fn create_session(
        &self,
        surface: Arc<dyn MediaSurface>,
    ) -> EngineResult<Arc<dyn EngineSession>>;
}

/// One engine instance attached to one surface
#[async_trait]
pub trait EngineSession: Send + Sync {
    /// Fetch the manifest and start feeding the surface
    async fn load(&self, source: &Url) -> EngineResult<()>;

    fn variant_tracks(&self) -> Vec<VariantInfo>;

    fn text_tracks(&self) -> Vec<TextInfo>;

    fn select_audio_language(&self, language: &str) -> EngineResult<()>;

    /// `None` hides subtitles
    fn select_text_language(&self, language: Option<&str>) -> EngineResult<()>;

    /// Release all engine resources and detach from the surface
    async fn destroy(&self) -> EngineResult<()>;
}
