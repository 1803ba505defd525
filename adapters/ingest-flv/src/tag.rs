//! FLV tag types and tag header decoding

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::timestamp::ClockConfig;

/// Size of the "previous tag size" field preceding every tag header
pub const PREVIOUS_TAG_SIZE_LEN: usize = 4;

/// Size of the tag header following the previous tag size
pub const TAG_HEADER_LEN: usize = 11;

/// Kind of media carried by a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    /// Audio tag (type 8)
    Audio,
    /// Video tag (type 9)
    Video,
    /// Script data / metadata tag (type 18)
    Data,
    /// Any other type byte, passed through uninterpreted
    Other(u8),
}

impl TagType {
    /// Type byte of an audio tag
    pub const AUDIO: u8 = 8;
    /// Type byte of a video tag
    pub const VIDEO: u8 = 9;
    /// Type byte of a script data tag
    pub const DATA: u8 = 18;

    /// Raw type byte as it appears on the wire
    pub fn as_u8(self) -> u8 {
        match self {
            TagType::Audio => Self::AUDIO,
            TagType::Video => Self::VIDEO,
            TagType::Data => Self::DATA,
            TagType::Other(b) => b,
        }
    }

    /// Lowercase name, `"other"` for unrecognised type bytes
    pub fn as_str(self) -> &'static str {
        match self {
            TagType::Audio => "audio",
            TagType::Video => "video",
            TagType::Data => "data",
            TagType::Other(_) => "other",
        }
    }
}

impl From<u8> for TagType {
    fn from(b: u8) -> Self {
        match b {
            Self::AUDIO => TagType::Audio,
            Self::VIDEO => TagType::Video,
            Self::DATA => TagType::Data,
            other => TagType::Other(other),
        }
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagType::Other(b) => write!(f, "other({})", b),
            known => f.write_str(known.as_str()),
        }
    }
}

/// Decoded 11-byte tag header
///
/// ```text
/// offset  size  field
/// 0       1     tag type
/// 1       3     data size        (big-endian)
/// 4       3     timestamp bits 0-23  (big-endian)
/// 7       1     timestamp bits 24-31
/// 8       3     stream id        (always 0, ignored)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub tag_type: TagType,
    /// Payload length in bytes (24-bit)
    pub data_size: u32,
    /// Composed 32-bit timestamp in milliseconds
    pub timestamp_ms: u32,
}

impl TagHeader {
    /// Decode a tag header
    ///
    /// The extended byte at offset 7 carries the most significant timestamp
    /// bits even though it follows the three low bytes.
    pub fn parse(b: &[u8; TAG_HEADER_LEN]) -> Self {
        let data_size = u32::from_be_bytes([0, b[1], b[2], b[3]]);
        let timestamp_ms = u32::from_be_bytes([b[7], b[4], b[5], b[6]]);

        Self {
            tag_type: TagType::from(b[0]),
            data_size,
            timestamp_ms,
        }
    }
}

/// One demuxed tag
///
/// The payload is owned by the caller; the transport keeps no reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub tag_type: TagType,
    /// Presentation timestamp in milliseconds, as carried by the container
    pub timestamp_ms: u32,
    /// Tag body, exactly `data_size` bytes long
    pub data: Bytes,
}

impl Tag {
    /// Payload length in bytes, equal to the header's data size
    pub fn data_size(&self) -> u32 {
        // Payload length is bounded by the 24-bit size field
        self.data.len() as u32
    }

    /// Whether this is an audio tag
    pub fn is_audio(&self) -> bool {
        self.tag_type == TagType::Audio
    }

    /// Whether this is a video tag
    pub fn is_video(&self) -> bool {
        self.tag_type == TagType::Video
    }

    /// Whether this is a script data tag
    pub fn is_data(&self) -> bool {
        self.tag_type == TagType::Data
    }

    /// Timestamp in clock units for this tag's media clock
    ///
    /// Returns `None` for tags without a media clock (script data and unknown
    /// types).
    pub fn clock_timestamp(&self, clocks: &ClockConfig) -> Option<u32> {
        clocks
            .clock_rate_for(self.tag_type)
            .map(|rate| crate::timestamp::to_clock_units(self.timestamp_ms, rate))
    }
}
