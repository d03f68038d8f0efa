//! Error types for Framecast Core

use crate::engine::{EngineError, EngineErrorCategory};
use crate::types::{SessionPhase, TrackKind};
use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a failed load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadFailureKind {
    /// Manifest or segment request failed
    Network,
    /// Load did not settle within the configured timeout
    Timeout,
    /// Manifest could not be parsed
    Manifest,
    /// Codec mismatch or undecodable media
    Media,
    /// License or key system failure
    Drm,
    /// Anything the engine did not categorise
    Unknown,
}

impl LoadFailureKind {
    /// Transient failures may succeed if the same source is bound again
    pub fn is_transient(&self) -> bool {
        matches!(self, LoadFailureKind::Network | LoadFailureKind::Timeout)
    }
}

impl From<EngineErrorCategory> for LoadFailureKind {
    fn from(category: EngineErrorCategory) -> Self {
        match category {
            EngineErrorCategory::Network => LoadFailureKind::Network,
            EngineErrorCategory::Manifest => LoadFailureKind::Manifest,
            EngineErrorCategory::Media | EngineErrorCategory::Text => LoadFailureKind::Media,
            EngineErrorCategory::Drm => LoadFailureKind::Drm,
            EngineErrorCategory::Streaming
            | EngineErrorCategory::Player
            | EngineErrorCategory::Cast
            | EngineErrorCategory::Storage
            | EngineErrorCategory::Ads => LoadFailureKind::Unknown,
        }
    }
}

impl std::fmt::Display for LoadFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailureKind::Network => write!(f, "network"),
            LoadFailureKind::Timeout => write!(f, "timeout"),
            LoadFailureKind::Manifest => write!(f, "manifest"),
            LoadFailureKind::Media => write!(f, "media"),
            LoadFailureKind::Drm => write!(f, "drm"),
            LoadFailureKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Environment errors
    #[error("Environment not supported: {0}")]
    UnsupportedEnvironment(String),

    // Load errors
    #[error("Failed to load source ({kind}): {message}")]
    LoadFailure { kind: LoadFailureKind, message: String },

    #[error("Session torn down while load was in flight")]
    TeardownDuringLoad,

    #[error("Session already destroyed")]
    SessionDestroyed,

    #[error("Invalid session phase transition: {from} -> {to}")]
    InvalidStateTransition {
        from: SessionPhase,
        to: SessionPhase,
    },

    // Command errors
    #[error("Command '{command}' ignored in phase {phase}")]
    CommandOnInvalidPhase {
        command: &'static str,
        phase: SessionPhase,
    },

    #[error("No {kind} track with language '{language}'")]
    TrackNotFound { kind: TrackKind, language: String },

    // Collaborator errors
    #[error("Media surface error: {0}")]
    Surface(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a surface error
    pub fn surface(msg: impl Into<String>) -> Self {
        Error::Surface(msg.into())
    }

    /// Build a load failure from an engine error
    pub fn load_failure(err: &EngineError) -> Self {
        Error::LoadFailure {
            kind: err.category.into(),
            message: err.to_string(),
        }
    }

    /// Returns true if a fresh bind of the same source may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::LoadFailure { kind, .. } => kind.is_transient(),
            Error::Surface(_) | Error::TeardownDuringLoad => true,
            _ => false,
        }
    }

    /// Returns true if the error only reports a dropped command
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            Error::CommandOnInvalidPhase { .. } | Error::TeardownDuringLoad
        )
    }

    /// Returns the error code for notices and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UnsupportedEnvironment(_) => "UNSUPPORTED_ENVIRONMENT",
            Error::LoadFailure { .. } => "LOAD_FAILURE",
            Error::TeardownDuringLoad => "TEARDOWN_DURING_LOAD",
            Error::SessionDestroyed => "SESSION_DESTROYED",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::CommandOnInvalidPhase { .. } => "INVALID_PHASE",
            Error::TrackNotFound { .. } => "TRACK_NOT_FOUND",
            Error::Surface(_) => "SURFACE",
            Error::Engine(_) => "ENGINE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
            Error::Io(_) => "IO",
        }
    }
}

/// Non-blocking, user-visible notification raised by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The hosting environment cannot decode or stream
    UnsupportedEnvironment,
    /// The source failed to load; `transient` hints that a retry may work
    LoadFailed {
        kind: LoadFailureKind,
        transient: bool,
    },
}

impl Notice {
    /// Map an error onto the notice shown to the viewer, if any
    pub fn from_error(err: &Error) -> Option<Self> {
        match err {
            Error::UnsupportedEnvironment(_) => Some(Notice::UnsupportedEnvironment),
            Error::LoadFailure { kind, .. } => Some(Notice::LoadFailed {
                kind: *kind,
                transient: kind.is_transient(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::UnsupportedEnvironment => write!(f, "Browser not supported"),
            Notice::LoadFailed { transient: true, .. } => {
                write!(f, "Playback failed to start. Check your connection and try again.")
            }
            Notice::LoadFailed { kind, .. } => {
                write!(f, "This video could not be played ({} error).", kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_category_classification() {
        assert_eq!(LoadFailureKind::from(EngineErrorCategory::Network), LoadFailureKind::Network);
        assert_eq!(LoadFailureKind::from(EngineErrorCategory::Manifest), LoadFailureKind::Manifest);
        assert_eq!(LoadFailureKind::from(EngineErrorCategory::Text), LoadFailureKind::Media);
        assert_eq!(LoadFailureKind::from(EngineErrorCategory::Cast), LoadFailureKind::Unknown);
        assert_eq!(LoadFailureKind::from(EngineErrorCategory::Ads), LoadFailureKind::Unknown);
        assert_eq!(EngineErrorCategory::Ads.to_string(), "ADS");
        assert!(LoadFailureKind::Timeout.is_transient());
        assert!(!LoadFailureKind::Manifest.is_transient());
    }

    #[test]
    fn test_recoverable_and_ignorable() {
        let transient = Error::LoadFailure {
            kind: LoadFailureKind::Network,
            message: "HTTP 503".into(),
        };
        let bad_source = Error::LoadFailure {
            kind: LoadFailureKind::Manifest,
            message: "not a playlist".into(),
        };
        assert!(transient.is_recoverable());
        assert!(!bad_source.is_recoverable());

        let ignored = Error::CommandOnInvalidPhase {
            command: "seek",
            phase: SessionPhase::Failed,
        };
        assert!(ignored.is_ignorable());
        assert_eq!(ignored.error_code(), "INVALID_PHASE");
    }

    #[test]
    fn test_notices_are_distinct() {
        let unsupported = Notice::from_error(&Error::UnsupportedEnvironment("no MSE".into()));
        assert_eq!(unsupported, Some(Notice::UnsupportedEnvironment));
        assert_eq!(unsupported.unwrap().to_string(), "Browser not supported");

        let failed = Notice::from_error(&Error::LoadFailure {
            kind: LoadFailureKind::Timeout,
            message: "timed out".into(),
        });
        assert_eq!(
            failed,
            Some(Notice::LoadFailed {
                kind: LoadFailureKind::Timeout,
                transient: true
            })
        );

        assert!(Notice::from_error(&Error::SessionDestroyed).is_none());
    }
}
