//! Error types for the FLV ingest adapter

use thiserror::Error;

/// Result type alias for FLV demuxing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while opening or reading an FLV stream
///
/// Format errors are only produced by [`FlvTransport::open`](crate::FlvTransport::open)
/// and are always fatal to the transport. I/O errors can surface from any read.
/// A clean end of stream is not an error; see
/// [`FlvTransport::next_tag`](crate::FlvTransport::next_tag).
#[derive(Debug, Error)]
pub enum Error {
    /// The first three bytes are not the `FLV` signature
    #[error("FLV format error: wrong signature {found:02x?}")]
    WrongSignature {
        /// Bytes found where the signature was expected
        found: [u8; 3],
    },

    /// The declared header length is shorter than the fixed 9-byte prefix
    #[error("FLV format error: invalid header length {header_length} (minimum 9)")]
    InvalidHeaderLength {
        /// Header length as declared in the stream
        header_length: u32,
    },

    /// The source ran out of data, or failed, in the middle of a structure
    #[error("FLV stream truncated while reading {context}")]
    Truncated {
        /// Which structure was being read
        context: &'static str,
        /// Underlying source failure, unmodified
        #[source]
        source: std::io::Error,
    },

    /// Source failure outside of a structure read (e.g. on close)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Clock configuration rejected by validation
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for errors describing a malformed container header
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::WrongSignature { .. } | Error::InvalidHeaderLength { .. }
        )
    }

    /// True for errors caused by a failed or short read from the source
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Truncated { .. } | Error::Io(_))
    }

    pub(crate) fn truncated(context: &'static str, source: std::io::Error) -> Self {
        Error::Truncated { context, source }
    }
}
