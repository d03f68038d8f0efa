//! Core types for Framecast

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Unique identifier for a bound session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No source bound yet
    Uninitialized,
    /// Source is being loaded by the engine
    Loading,
    /// Load settled successfully, tracks are known
    Ready,
    /// Load settled with an error
    Failed,
    /// Session released; terminal
    Destroyed,
}

impl SessionPhase {
    /// Check if transition to target phase is valid
    pub fn can_transition_to(&self, target: SessionPhase) -> bool {
        use SessionPhase::*;
        match (self, target) {
            (Uninitialized, Loading) => true,
            (Loading, Ready) | (Loading, Failed) => true,
            (Destroyed, _) => false,
            (_, Destroyed) => true,
            _ => false,
        }
    }

    /// Loading or Ready: the session currently owns the surface
    pub fn is_live(&self) -> bool {
        matches!(self, SessionPhase::Loading | SessionPhase::Ready)
    }

    /// Load has settled one way or the other
    pub fn is_settled(&self) -> bool {
        matches!(self, SessionPhase::Ready | SessionPhase::Failed)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Uninitialized => write!(f, "uninitialized"),
            SessionPhase::Loading => write!(f, "loading"),
            SessionPhase::Ready => write!(f, "ready"),
            SessionPhase::Failed => write!(f, "failed"),
            SessionPhase::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Snapshot of a session for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub source: Url,
    pub phase: SessionPhase,
    pub bound_at: DateTime<Utc>,
}

/// Kind of selectable rendition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Text,
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Text => write!(f, "text"),
        }
    }
}

/// A selectable audio or subtitle rendition, snapshotted at Ready time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Engine-assigned identifier
    pub id: String,
    /// BCP-47 language code
    pub language: Option<String>,
    /// Human-readable name
    pub label: Option<String>,
    pub kind: TrackKind,
}

impl Track {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            language: None,
            label: None,
            kind,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this track answers to the given language code
    pub fn matches_language(&self, language: &str) -> bool {
        self.language
            .as_deref()
            .is_some_and(|lang| lang.eq_ignore_ascii_case(language))
    }

    /// Name shown in a selector: label, then language, then id
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.language.as_deref())
            .unwrap_or(&self.id)
    }
}

/// UI-observable playback state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Seconds, never negative
    pub current_time: f64,
    /// Seconds; `None` until metadata arrives
    pub duration: Option<f64>,
    /// Always within [0, 1]
    pub volume: f64,
    pub muted: bool,
    pub selected_audio_track: Option<Track>,
    /// `None` means subtitles are off
    pub selected_text_track: Option<Track>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: None,
            volume: 1.0,
            muted: false,
            selected_audio_track: None,
            selected_text_track: None,
        }
    }
}

impl PlaybackState {
    /// Fraction of the content played, if the duration is known
    pub fn progress(&self) -> Option<f64> {
        match self.duration {
            Some(d) if d > 0.0 => Some((self.current_time / d).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}

/// Clamp a volume into [0, 1]; NaN maps to silence
pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Clamp a position into [0, duration], or only to >= 0 while the duration is unknown
pub fn clamp_position(position: f64, duration: Option<f64>) -> f64 {
    let position = if position.is_nan() { 0.0 } else { position };
    match duration {
        Some(dur) if dur.is_finite() => position.clamp(0.0, dur.max(0.0)),
        _ => position.max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        assert!(SessionPhase::Uninitialized.can_transition_to(SessionPhase::Loading));
        assert!(SessionPhase::Loading.can_transition_to(SessionPhase::Ready));
        assert!(SessionPhase::Loading.can_transition_to(SessionPhase::Failed));
        assert!(SessionPhase::Failed.can_transition_to(SessionPhase::Destroyed));
        assert!(SessionPhase::Uninitialized.can_transition_to(SessionPhase::Destroyed));

        assert!(!SessionPhase::Ready.can_transition_to(SessionPhase::Loading));
        assert!(!SessionPhase::Destroyed.can_transition_to(SessionPhase::Destroyed));
        assert!(!SessionPhase::Destroyed.can_transition_to(SessionPhase::Loading));
    }

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(-3.0, Some(10.0)), 0.0);
        assert_eq!(clamp_position(12.0, Some(10.0)), 10.0);
        assert_eq!(clamp_position(500.0, None), 500.0);
        assert_eq!(clamp_position(-1.0, None), 0.0);
        assert_eq!(clamp_position(f64::NAN, Some(10.0)), 0.0);
    }

    #[test]
    fn test_clamp_volume() {
        assert_eq!(clamp_volume(1.5), 1.0);
        assert_eq!(clamp_volume(-0.2), 0.0);
        assert_eq!(clamp_volume(0.4), 0.4);
        assert_eq!(clamp_volume(f64::NAN), 0.0);
    }

    #[test]
    fn test_track_language_match() {
        let track = Track::new("a1", TrackKind::Audio).with_language("en-US");
        assert!(track.matches_language("en-us"));
        assert!(!track.matches_language("en"));
        assert_eq!(track.display_name(), "en-US");
        assert_eq!(Track::new("t9", TrackKind::Text).display_name(), "t9");
    }
}
