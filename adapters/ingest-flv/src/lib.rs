//! FLV Ingestion Adapter for RemoteMedia SDK
//!
//! This crate demuxes a raw FLV byte stream (file, socket, camera feed) into
//! typed, timestamped tags for downstream pipeline stages such as RTP
//! re-packetization.
//!
//! # Usage
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use remotemedia_ingest_flv::{ClockConfig, FlvTransport};
//!
//! # fn main() -> remotemedia_ingest_flv::Result<()> {
//! let file = BufReader::new(File::open("camera.flv")?);
//! let mut transport = FlvTransport::open(file)?;
//! let clocks = ClockConfig::default();
//!
//! while let Some(tag) = transport.next_tag()? {
//!     let rtp_ts = tag.clock_timestamp(&clocks);
//!     println!("{} @ {}ms ({:?}) {} bytes", tag.tag_type, tag.timestamp_ms, rtp_ts, tag.data.len());
//! }
//!
//! transport.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Scope
//!
//! The reader is strictly forward and single-pass. It does not look inside tag
//! payloads, does not correct non-monotonic timestamps and cannot seek.
//!
//! With the default `tokio` feature, [`FlvTagStream`] runs a transport on a
//! blocking worker and hands tags to async consumers.

pub mod error;
pub mod header;
pub mod source;
#[cfg(feature = "tokio")]
pub mod stream;
pub mod tag;
pub mod timestamp;
mod transport;

pub use error::{Error, Result};
pub use header::{read_header, FlvHeader, FLV_SIGNATURE};
pub use source::Source;
#[cfg(feature = "tokio")]
pub use stream::FlvTagStream;
pub use tag::{Tag, TagHeader, TagType};
pub use timestamp::{to_clock_units, ClockConfig};
pub use transport::FlvTransport;
