//! FLV file header validation
//!
//! ```text
//! offset  size  field
//! 0       3     signature "FLV"
//! 3       1     version        (ignored)
//! 4       1     type flags     (ignored)
//! 5       4     header length  (big-endian, >= 9)
//! 9       n     trailer        (header length - 9 bytes, skipped)
//! ```

use std::io::{self, Read};

use crate::error::{Error, Result};

/// Container signature at offset 0
pub const FLV_SIGNATURE: [u8; 3] = *b"FLV";

/// Size of the fixed header prefix
pub const FLV_HEADER_PREFIX_LEN: u32 = 9;

/// Decoded fixed header
///
/// Returned for inspection only; the transport does not keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlvHeader {
    /// Format version byte, not interpreted
    pub version: u8,
    /// Audio/video presence flags, not interpreted since some cameras
    /// (e.g. Reolink) write values that do not match the stream
    pub flags: u8,
    /// Declared total header length, prefix included
    pub header_length: u32,
}

impl FlvHeader {
    /// Number of trailer bytes following the fixed prefix
    ///
    /// Zero for a declared length shorter than the prefix, which
    /// [`read_header`] rejects.
    pub fn trailer_len(&self) -> u32 {
        self.header_length.saturating_sub(FLV_HEADER_PREFIX_LEN)
    }
}

/// Read and validate the header, leaving `reader` at the first tag record
///
/// Consumes the 9-byte prefix plus any trailer bytes declared by the header
/// length. Nothing past the prefix is read when the signature is wrong.
pub fn read_header<R: Read + ?Sized>(reader: &mut R) -> Result<FlvHeader> {
    let mut prefix = [0u8; FLV_HEADER_PREFIX_LEN as usize];
    reader
        .read_exact(&mut prefix)
        .map_err(|e| Error::truncated("file header", e))?;

    let found = [prefix[0], prefix[1], prefix[2]];
    if found != FLV_SIGNATURE {
        return Err(Error::WrongSignature { found });
    }

    let header = FlvHeader {
        version: prefix[3],
        flags: prefix[4],
        header_length: u32::from_be_bytes([prefix[5], prefix[6], prefix[7], prefix[8]]),
    };

    if header.header_length < FLV_HEADER_PREFIX_LEN {
        return Err(Error::InvalidHeaderLength {
            header_length: header.header_length,
        });
    }

    let skip = header.trailer_len();
    if skip > 0 {
        skip_exact(reader, u64::from(skip)).map_err(|e| Error::truncated("header trailer", e))?;
    }

    tracing::debug!(
        version = header.version,
        flags = header.flags,
        trailer_len = skip,
        "FLV header accepted"
    );

    Ok(header)
}

/// Discard exactly `len` bytes without buffering them all
fn skip_exact<R: Read + ?Sized>(reader: &mut R, len: u64) -> io::Result<()> {
    let copied = io::copy(&mut (&mut *reader).take(len), &mut io::sink())?;
    if copied < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, source ended after {}", len, copied),
        ));
    }
    Ok(())
}
