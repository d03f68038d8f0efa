//! Track registry
//!
//! A read-only snapshot of the audio and text tracks a Ready session reports.
//! Audio tracks are variants that carry audio, de-duplicated by
//! (language, label) since the engine reports one variant per bitrate.
//! Lookups by language return the first match in report order.

use crate::engine::{TextInfo, VariantInfo};
use crate::types::{Track, TrackKind};
use std::collections::HashSet;

/// Audio and text tracks of one Ready session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackRegistry {
    audio: Vec<Track>,
    text: Vec<Track>,
}

impl TrackRegistry {
    /// Registry with no tracks; what callers see before Ready
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive a registry from engine-reported renditions
    pub fn from_renditions(variants: &[VariantInfo], texts: &[TextInfo]) -> Self {
        let mut seen = HashSet::new();
        let audio = variants
            .iter()
            .filter(|v| v.has_audio)
            .filter(|v| seen.insert((v.language.clone(), v.label.clone())))
            .map(|v| Track {
                id: v.id.clone(),
                language: v.language.clone(),
                label: v.label.clone(),
                kind: TrackKind::Audio,
            })
            .collect();

        let text = texts
            .iter()
            .map(|t| Track {
                id: t.id.clone(),
                language: t.language.clone(),
                label: t.label.clone(),
                kind: TrackKind::Text,
            })
            .collect();

        Self { audio, text }
    }

    pub fn audio_tracks(&self) -> &[Track] {
        &self.audio
    }

    pub fn text_tracks(&self) -> &[Track] {
        &self.text
    }

    pub fn tracks(&self, kind: TrackKind) -> &[Track] {
        match kind {
            TrackKind::Audio => &self.audio,
            TrackKind::Text => &self.text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_empty() && self.text.is_empty()
    }

    /// First track of `kind` whose language matches
    pub fn find(&self, kind: TrackKind, language: &str) -> Option<&Track> {
        self.tracks(kind).iter().find(|t| t.matches_language(language))
    }

    /// Languages reported more than once for `kind`; selection by these is ambiguous
    pub fn ambiguous_languages(&self, kind: TrackKind) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for lang in self.tracks(kind).iter().filter_map(|t| t.language.as_deref()) {
            let key = lang.to_ascii_lowercase();
            if !seen.insert(key.clone()) && !dupes.contains(&key) {
                dupes.push(key);
            }
        }
        dupes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: &str, lang: Option<&str>, label: Option<&str>, has_audio: bool) -> VariantInfo {
        VariantInfo {
            id: id.into(),
            language: lang.map(Into::into),
            label: label.map(Into::into),
            has_audio,
            bandwidth: 1_000_000,
        }
    }

    fn text(id: &str, lang: &str, label: &str) -> TextInfo {
        TextInfo {
            id: id.into(),
            language: Some(lang.into()),
            label: Some(label.into()),
            kind: "subtitles".into(),
        }
    }

    #[test]
    fn test_filters_video_only_and_dedupes_bitrates() {
        let variants = vec![
            variant("v1", Some("en"), Some("English"), true),
            variant("v2", Some("en"), Some("English"), true),
            variant("v3", None, None, false),
            variant("v4", Some("de"), Some("Deutsch"), true),
        ];
        let registry = TrackRegistry::from_renditions(&variants, &[]);

        let ids: Vec<_> = registry.audio_tracks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["v1", "v4"]);
        assert!(registry.text_tracks().is_empty());
    }

    #[test]
    fn test_first_match_on_duplicate_language() {
        let texts = vec![
            text("t1", "en", "English"),
            text("t2", "en", "English (SDH)"),
            text("t3", "es", "Español"),
        ];
        let registry = TrackRegistry::from_renditions(&[], &texts);

        assert_eq!(registry.find(TrackKind::Text, "EN").map(|t| t.id.as_str()), Some("t1"));
        assert_eq!(registry.ambiguous_languages(TrackKind::Text), vec!["en".to_string()]);
        assert!(registry.find(TrackKind::Text, "ja").is_none());
        assert!(registry.find(TrackKind::Audio, "en").is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = TrackRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.ambiguous_languages(TrackKind::Audio).is_empty());
    }
}
