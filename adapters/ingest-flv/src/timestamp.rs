//! Millisecond to media clock conversion
//!
//! FLV timestamps are milliseconds. Real-time transports such as RTP express
//! time in ticks of a per-media clock (e.g. 90 kHz for video).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tag::TagType;

/// Convert a millisecond timestamp into ticks of a `clock_rate` Hz clock
///
/// The product is computed in 64 bits so it cannot overflow; only the final
/// quotient is narrowed to 32 bits, wrapping the way RTP timestamps do.
pub fn to_clock_units(time_ms: u32, clock_rate: u32) -> u32 {
    (u64::from(time_ms) * u64::from(clock_rate) / 1000) as u32
}

/// Clock rates used when converting tag timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Audio clock rate (typically 48000 Hz)
    pub audio_clock_rate: u32,
    /// Video clock rate (typically 90000 Hz)
    pub video_clock_rate: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            audio_clock_rate: 48000,
            video_clock_rate: 90000,
        }
    }
}

impl ClockConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio_clock_rate == 0 {
            return Err(Error::InvalidConfig(
                "audio clock rate must be greater than zero".to_string(),
            ));
        }
        if self.video_clock_rate == 0 {
            return Err(Error::InvalidConfig(
                "video clock rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Clock rate for a tag type, `None` when the tag has no media clock
    pub fn clock_rate_for(&self, tag_type: TagType) -> Option<u32> {
        match tag_type {
            TagType::Audio => Some(self.audio_clock_rate),
            TagType::Video => Some(self.video_clock_rate),
            TagType::Data | TagType::Other(_) => None,
        }
    }
}
