//! Control surface
//!
//! Issues viewer commands against a mounted [`VideoPlayer`] and derives the
//! render model for the controls. Holds no state of its own; ignorable
//! failures (commands in the wrong phase, refused play requests) are logged
//! here instead of reaching the UI.

use crate::error::Notice;
use crate::player::VideoPlayer;
use crate::types::{SessionPhase, Track};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thin command wrapper borrowed from a player
pub struct ControlSurface<'a> {
    player: &'a VideoPlayer,
}

impl<'a> ControlSurface<'a> {
    pub fn new(player: &'a VideoPlayer) -> Self {
        Self { player }
    }

    pub async fn toggle_play(&self) {
        swallow("toggle_play", self.player.toggle_play().await);
    }

    pub fn seek(&self, time: f64) {
        swallow("seek", self.player.seek(time));
    }

    /// Seek relative to the current position
    pub fn skip(&self, delta: f64) {
        let now = self.player.state().current_time;
        self.seek(now + delta);
    }

    pub fn set_volume(&self, volume: f64) {
        swallow("set_volume", self.player.set_volume(volume));
    }

    pub fn toggle_mute(&self) {
        swallow("toggle_mute", self.player.toggle_mute());
    }

    pub async fn toggle_fullscreen(&self) {
        self.player.toggle_fullscreen().await;
    }

    pub fn select_audio(&self, language: &str) {
        swallow("select_audio", self.player.select_audio_track(language));
    }

    /// `None` or "none" turns subtitles off
    pub fn select_text(&self, language: Option<&str>) {
        swallow("select_text", self.player.select_text_track(language));
    }

    /// Render model for the current player state
    pub fn view(&self) -> ControlsView {
        let state = self.player.state();
        let tracks = self.player.tracks();

        let audio_options = options(
            tracks.audio_tracks(),
            state.selected_audio_track.as_ref(),
            false,
        );
        let text_options = options(
            tracks.text_tracks(),
            state.selected_text_track.as_ref(),
            true,
        );

        ControlsView {
            phase: self.player.phase(),
            is_playing: state.is_playing,
            play_label: (if state.is_playing { "Pause" } else { "Play" }).to_string(),
            elapsed: format_time(state.current_time),
            total: state.duration.map(format_time),
            progress: state.progress(),
            volume: state.volume,
            muted: state.muted,
            audio_options,
            text_options,
            notice: self.player.notice().as_ref().map(Notice::to_string),
        }
    }
}

fn swallow<T>(command: &str, result: Result<T>) {
    match result {
        Ok(_) => {}
        Err(err) if err.is_ignorable() => debug!(command, error = %err, "Command ignored"),
        Err(Error::TrackNotFound { kind, language }) => {
            debug!(command, %kind, language, "No such track")
        }
        Err(err) => debug!(command, error = %err, code = err.error_code(), "Command failed"),
    }
}

/// Build selector options; `None` when there is nothing to choose from
///
/// Selection goes by language, so tracks without one are left out.
fn options(tracks: &[Track], selected: Option<&Track>, with_off: bool) -> Option<Vec<TrackOption>> {
    let selectable: Vec<(&Track, &str)> = tracks
        .iter()
        .filter_map(|track| track.language.as_deref().map(|lang| (track, lang)))
        .collect();
    if selectable.is_empty() {
        return None;
    }

    let mut options = Vec::with_capacity(selectable.len() + 1);
    if with_off {
        options.push(TrackOption {
            value: "none".to_string(),
            label: "Off".to_string(),
            selected: selected.is_none(),
        });
    }
    options.extend(selectable.into_iter().map(|(track, lang)| TrackOption {
        value: lang.to_string(),
        label: track.display_name().to_string(),
        selected: selected.is_some_and(|s| s.id == track.id),
    }));
    Some(options)
}

/// One entry of a track selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackOption {
    /// Value passed back to the select command
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Everything the controls need to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsView {
    pub phase: SessionPhase,
    pub is_playing: bool,
    pub play_label: String,
    pub elapsed: String,
    /// `None` while the duration is unknown
    pub total: Option<String>,
    pub progress: Option<f64>,
    pub volume: f64,
    pub muted: bool,
    /// `None` hides the audio selector
    pub audio_options: Option<Vec<TrackOption>>,
    /// `None` hides the subtitle selector
    pub text_options: Option<Vec<TrackOption>>,
    pub notice: Option<String>,
}

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour up
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackKind;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(61.0), "1:01");
        assert_eq!(format_time(3725.0), "1:02:05");
        assert_eq!(format_time(-4.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_empty_tracks_hide_selector() {
        assert!(options(&[], None, true).is_none());
    }

    #[test]
    fn test_tracks_without_language_not_offered() {
        let captions = vec![Track::new("cc1", TrackKind::Text)];
        assert!(options(&captions, None, true).is_none());

        let mixed = vec![
            Track::new("cc1", TrackKind::Text),
            Track::new("t2", TrackKind::Text).with_language("fr"),
        ];
        let values: Vec<_> = options(&mixed, None, true)
            .unwrap()
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(values, ["none", "fr"]);
    }

    #[test]
    fn test_text_options_include_off() {
        let tracks = vec![
            Track::new("t1", TrackKind::Text).with_language("en").with_label("English"),
            Track::new("t2", TrackKind::Text).with_language("fr"),
        ];
        let opts = options(&tracks, None, true).unwrap();
        assert_eq!(opts.len(), 3);
        assert_eq!(opts[0].value, "none");
        assert!(opts[0].selected);
        assert_eq!(opts[1].label, "English");
        assert_eq!(opts[2].label, "fr");

        let opts = options(&tracks, Some(&tracks[1]), true).unwrap();
        assert!(!opts[0].selected);
        assert!(opts[2].selected);
    }
}
