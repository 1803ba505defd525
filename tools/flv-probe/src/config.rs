//! Probe configuration
//!
//! Loaded from an optional TOML file, then overridden by command-line flags.
//!
//! ```toml
//! max_tags = 1000
//!
//! [clock]
//! audio_clock_rate = 44100
//! video_clock_rate = 90000
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use remotemedia_ingest_flv::ClockConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Clock rates used for converted timestamps
    pub clock: ClockConfig,

    /// Stop after this many tags (all tags when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tags: Option<u64>,
}

impl ProbeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ProbeConfig = toml::from_str(text)?;
        Ok(config)
    }

    /// Apply command-line overrides and validate the result
    pub fn with_overrides(
        mut self,
        audio_clock_rate: Option<u32>,
        video_clock_rate: Option<u32>,
        max_tags: Option<u64>,
    ) -> Result<Self> {
        if let Some(rate) = audio_clock_rate {
            self.clock.audio_clock_rate = rate;
        }
        if let Some(rate) = video_clock_rate {
            self.clock.video_clock_rate = rate;
        }
        if max_tags.is_some() {
            self.max_tags = max_tags;
        }
        self.clock.validate()?;
        Ok(self)
    }
}
