//! Player configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Schemes a source locator may use
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "file", "blob", "data"];

/// Configuration for a mounted player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Manifest or media to load on mount
    pub source: Option<Url>,
    /// Volume applied to the surface on mount (0.0 - 1.0)
    pub initial_volume: f64,
    /// Start muted
    pub muted: bool,
    /// Issue play as soon as the load settles Ready
    pub autoplay: bool,
    /// Ask the engine to install its polyfills before the support check
    pub install_polyfills: bool,
    /// Abandon a load that has not settled in time (0 = wait forever)
    pub load_timeout_ms: u64,
    /// Audio language selected after load, if present
    pub preferred_audio_language: Option<String>,
    /// Subtitle language selected after load, if present
    pub preferred_text_language: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source: None,
            initial_volume: 1.0,
            muted: false,
            autoplay: false,
            install_polyfills: true,
            load_timeout_ms: 0,
            preferred_audio_language: None,
            preferred_text_language: None,
        }
    }
}

impl PlayerConfig {
    /// Config with a source and defaults for everything else
    pub fn with_source(source: Url) -> Self {
        Self {
            source: Some(source),
            ..Default::default()
        }
    }

    /// Load timeout as a duration, if one is configured
    pub fn load_timeout(&self) -> Option<Duration> {
        (self.load_timeout_ms > 0).then(|| Duration::from_millis(self.load_timeout_ms))
    }

    /// Reject values the player cannot honour
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(Error::InvalidConfig(format!(
                "initial_volume must be within [0, 1], got {}",
                self.initial_volume
            )));
        }
        if let Some(source) = &self.source {
            validate_source(source)?;
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Check a source locator can be handed to the engine
pub fn validate_source(source: &Url) -> Result<()> {
    if SUPPORTED_SCHEMES.contains(&source.scheme()) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "unsupported source scheme '{}'",
            source.scheme()
        )))
    }
}
