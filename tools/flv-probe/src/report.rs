//! Per-tag records and the end-of-stream summary

use std::collections::BTreeMap;
use std::fmt;

use remotemedia_ingest_flv::{ClockConfig, Tag, TagType};
use serde::Serialize;

/// One printed line per tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub index: u64,
    #[serde(rename = "type")]
    pub tag_type: String,
    pub type_id: u8,
    pub timestamp_ms: u32,
    /// Timestamp in media clock units, absent for script data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_timestamp: Option<u32>,
    pub data_size: u32,
}

impl TagRecord {
    pub fn new(index: u64, tag: &Tag, clocks: &ClockConfig) -> Self {
        Self {
            index,
            tag_type: tag.tag_type.to_string(),
            type_id: tag.tag_type.as_u8(),
            timestamp_ms: tag.timestamp_ms,
            clock_timestamp: tag.clock_timestamp(clocks),
            data_size: tag.data_size(),
        }
    }
}

impl fmt::Display for TagRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:<6} {:<9} ts={:>10}ms size={:>8}",
            self.index, self.tag_type, self.timestamp_ms, self.data_size
        )?;
        if let Some(clock) = self.clock_timestamp {
            write!(f, " clock={}", clock)?;
        }
        Ok(())
    }
}

/// Totals accumulated over a probe run
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub tags: u64,
    pub bytes: u64,
    pub per_type: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_timestamp_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp_ms: Option<u32>,
    /// Tags whose timestamp went backwards relative to the previous tag of
    /// the same type; reported, never corrected
    pub non_monotonic: u64,
    #[serde(skip)]
    last_by_type: BTreeMap<u8, u32>,
}

impl Summary {
    pub fn record(&mut self, tag: &Tag) {
        self.tags += 1;
        self.bytes += u64::from(tag.data_size());
        *self.per_type.entry(tag.tag_type.to_string()).or_default() += 1;

        self.first_timestamp_ms.get_or_insert(tag.timestamp_ms);
        self.last_timestamp_ms = Some(tag.timestamp_ms);

        if tag.tag_type != TagType::Data {
            let key = tag.tag_type.as_u8();
            if let Some(prev) = self.last_by_type.insert(key, tag.timestamp_ms) {
                if tag.timestamp_ms < prev {
                    self.non_monotonic += 1;
                }
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tags: {} ({} payload bytes)", self.tags, self.bytes)?;
        for (kind, count) in &self.per_type {
            writeln!(f, "  {:<9} {}", kind, count)?;
        }
        if let (Some(first), Some(last)) = (self.first_timestamp_ms, self.last_timestamp_ms) {
            writeln!(f, "timestamps: {}ms .. {}ms", first, last)?;
        }
        write!(f, "non-monotonic timestamps: {}", self.non_monotonic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(type_id: u8, timestamp_ms: u32, size: usize) -> Tag {
        Tag {
            tag_type: TagType::from(type_id),
            timestamp_ms,
            data: vec![0u8; size].into(),
        }
    }

    #[test]
    fn test_record_json_shape() {
        let record = TagRecord::new(3, &tag(9, 1000, 4), &ClockConfig::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["type_id"], 9);
        assert_eq!(json["clock_timestamp"], 90000);
        assert_eq!(json["data_size"], 4);

        let record = TagRecord::new(0, &tag(18, 0, 2), &ClockConfig::default());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("clock_timestamp").is_none());
    }

    #[test]
    fn test_summary_counts_and_regressions() {
        let mut summary = Summary::default();
        summary.record(&tag(18, 0, 10));
        summary.record(&tag(9, 40, 5));
        summary.record(&tag(8, 20, 3));
        summary.record(&tag(9, 33, 5));
        summary.record(&tag(8, 43, 3));

        assert_eq!(summary.tags, 5);
        assert_eq!(summary.bytes, 26);
        assert_eq!(summary.per_type["video"], 2);
        assert_eq!(summary.per_type["audio"], 2);
        assert_eq!(summary.per_type["data"], 1);
        assert_eq!(summary.first_timestamp_ms, Some(0));
        assert_eq!(summary.last_timestamp_ms, Some(43));
        assert_eq!(summary.non_monotonic, 1);
    }

    #[test]
    fn test_display_line() {
        let record = TagRecord::new(1, &tag(8, 20, 3), &ClockConfig::default());
        let line = record.to_string();
        assert!(line.contains("audio"));
        assert!(line.contains("ts=        20ms"));
        assert!(line.ends_with("clock=960"));
    }
}
