//! Reader settings: the validated peak rate and the optional TOML file.
//!
//! ```toml
//! [pacing]
//! peak_wpm = 650
//!
//! [display]
//! show_progress = true
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A peak reading rate in words per minute, within `100..=1200`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PeakRate(u32);

impl PeakRate {
    pub const MIN: u32 = 100;
    pub const MAX: u32 = 1200;
    pub const DEFAULT: PeakRate = PeakRate(650);

    pub fn wpm(self) -> u32 {
        self.0
    }
}

impl Default for PeakRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PeakRate {
    type Error = ConfigError;

    fn try_from(wpm: u32) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&wpm) {
            Ok(PeakRate(wpm))
        } else {
            Err(ConfigError::OutOfRange(wpm))
        }
    }
}

impl From<PeakRate> for u32 {
    fn from(rate: PeakRate) -> u32 {
        rate.0
    }
}

impl FromStr for PeakRate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        let trimmed = s.trim();
        let wpm: u32 = trimmed
            .parse()
            .map_err(|_| ConfigError::NotANumber(trimmed.to_string()))?;
        PeakRate::try_from(wpm)
    }
}

impl fmt::Display for PeakRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wpm", self.0)
    }
}

/// Settings file contents. Missing tables and keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pacing: PacingSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    /// Rate reached at the end of the ramp.
    pub peak_wpm: PeakRate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Show a position counter next to each word.
    pub show_progress: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::parse(&content).map_err(|detail| ConfigError::Parse {
            path: path.display().to_string(),
            detail,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.message().to_string())
    }
}
