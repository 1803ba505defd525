//! Forward-only FLV tag reader
//!
//! Each tag record on the wire is:
//!
//! ```text
//! 4 bytes   previous tag size (ignored)
//! 11 bytes  tag header (see [`TagHeader`])
//! n bytes   payload, n = data size
//! ```

use std::io::{self, Read};

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::header::read_header;
use crate::source::Source;
use crate::tag::{Tag, TagHeader, PREVIOUS_TAG_SIZE_LEN, TAG_HEADER_LEN};

/// An open FLV stream
///
/// Created by [`FlvTransport::open`], which validates the file header. The
/// transport owns its source for its whole lifetime and closes it exactly once:
/// on [`close`](FlvTransport::close), on drop, or when `open` fails.
///
/// Reads block the calling thread. A transport is a single reader; the
/// `&mut self` receivers keep calls serialized.
pub struct FlvTransport<S: Source> {
    /// `None` once the source has been closed
    source: Option<S>,
    tags_read: u64,
    /// Set after end of stream or an error; ends iteration
    finished: bool,
}

impl<S: Source> FlvTransport<S> {
    /// Validate the header and position the stream at the first tag
    ///
    /// On failure the source is closed before the error is returned.
    pub fn open(mut source: S) -> Result<Self> {
        match read_header(&mut source) {
            Ok(_) => Ok(Self {
                source: Some(source),
                tags_read: 0,
                finished: false,
            }),
            Err(e) => {
                if let Err(close_err) = source.close() {
                    tracing::warn!("Failed to close FLV source after open error: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Read the next tag
    ///
    /// Returns `Ok(None)` when the source ends cleanly between tags. A source
    /// that ends inside a tag yields [`Error::Truncated`]; a short payload is
    /// never returned.
    pub fn next_tag(&mut self) -> Result<Option<Tag>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };

        let result = read_tag(source);
        match &result {
            Ok(Some(tag)) => {
                self.tags_read += 1;
                tracing::trace!(
                    tag_type = %tag.tag_type,
                    timestamp_ms = tag.timestamp_ms,
                    data_size = tag.data.len(),
                    "FLV tag"
                );
            }
            Ok(None) => {
                self.finished = true;
                tracing::debug!(tags = self.tags_read, "End of FLV stream");
            }
            Err(_) => self.finished = true,
        }
        result
    }

    /// Number of tags returned so far
    pub fn tags_read(&self) -> u64 {
        self.tags_read
    }

    /// Close the transport and its source
    pub fn close(mut self) -> Result<()> {
        match self.source.take() {
            Some(mut source) => source.close().map_err(Error::Io),
            None => Ok(()),
        }
    }
}

impl<S: Source> Iterator for FlvTransport<S> {
    type Item = Result<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        self.next_tag().transpose()
    }
}

impl<S: Source> Drop for FlvTransport<S> {
    fn drop(&mut self) {
        if let Some(mut source) = self.source.take() {
            if let Err(e) = source.close() {
                tracing::warn!("Failed to close FLV source: {}", e);
            }
        }
    }
}

impl<S: Source> std::fmt::Debug for FlvTransport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlvTransport")
            .field("open", &self.source.is_some())
            .field("tags_read", &self.tags_read)
            .field("finished", &self.finished)
            .finish()
    }
}

fn read_tag<R: Read + ?Sized>(source: &mut R) -> Result<Option<Tag>> {
    let mut prev_size = [0u8; PREVIOUS_TAG_SIZE_LEN];
    match read_full(source, &mut prev_size).map_err(|e| Error::truncated("previous tag size", e))? {
        0 => return Ok(None),
        PREVIOUS_TAG_SIZE_LEN => {}
        n => return Err(short_read("previous tag size", PREVIOUS_TAG_SIZE_LEN, n)),
    }

    let mut raw = [0u8; TAG_HEADER_LEN];
    match read_full(source, &mut raw).map_err(|e| Error::truncated("tag header", e))? {
        TAG_HEADER_LEN => {}
        n => return Err(short_read("tag header", TAG_HEADER_LEN, n)),
    }
    let header = TagHeader::parse(&raw);

    let size = header.data_size as usize;
    let mut data = Vec::with_capacity(size);
    let n = (&mut *source)
        .take(size as u64)
        .read_to_end(&mut data)
        .map_err(|e| Error::truncated("tag payload", e))?;
    if n < size {
        return Err(short_read("tag payload", size, n));
    }

    Ok(Some(Tag {
        tag_type: header.tag_type,
        timestamp_ms: header.timestamp_ms,
        data: Bytes::from(data),
    }))
}

/// Fill `buf` unless the source ends first, returning the number of bytes read
fn read_full<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn short_read(context: &'static str, expected: usize, got: usize) -> Error {
    Error::truncated(
        context,
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, source ended after {}", expected, got),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::rc::Rc;

    fn flv_header() -> Vec<u8> {
        b"FLV\x01\x00\x00\x00\x00\x09".to_vec()
    }

    fn push_tag(out: &mut Vec<u8>, tag_type: u8, timestamp_ms: u32, payload: &[u8]) {
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.push(tag_type);
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
        let ts = timestamp_ms.to_be_bytes();
        out.extend_from_slice(&[ts[1], ts[2], ts[3], ts[0]]);
        out.extend_from_slice(&[0, 0, 0]);
        out.extend_from_slice(payload);
    }

    /// Cursor that records whether it was closed
    struct Tracked {
        inner: Cursor<Vec<u8>>,
        closes: Rc<Cell<u32>>,
    }

    impl Tracked {
        fn new(bytes: Vec<u8>) -> (Self, Rc<Cell<u32>>) {
            let closes = Rc::new(Cell::new(0));
            let source = Self {
                inner: Cursor::new(bytes),
                closes: Rc::clone(&closes),
            };
            (source, closes)
        }
    }

    impl Read for Tracked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Source for Tracked {
        fn close(&mut self) -> io::Result<()> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    /// Source that fails after yielding its bytes
    struct Failing(Cursor<Vec<u8>>);

    impl Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
                n => Ok(n),
            }
        }
    }

    impl Source for Failing {}

    #[test]
    fn test_reads_single_video_tag() {
        let mut bytes = flv_header();
        push_tag(&mut bytes, 9, 1, &[1, 2, 3, 4, 5]);

        let mut transport = FlvTransport::open(Cursor::new(bytes)).unwrap();
        let tag = transport.next_tag().unwrap().unwrap();
        assert!(tag.is_video());
        assert_eq!(tag.timestamp_ms, 1);
        assert_eq!(tag.data_size(), 5);
        assert_eq!(&tag.data[..], &[1, 2, 3, 4, 5]);

        assert!(transport.next_tag().unwrap().is_none());
        assert_eq!(transport.tags_read(), 1);
    }

    #[test]
    fn test_lone_previous_tag_size_is_truncated() {
        let mut bytes = flv_header();
        push_tag(&mut bytes, 8, 0, &[0xAF, 0x01]);
        bytes.extend_from_slice(&13u32.to_be_bytes());

        let mut transport = FlvTransport::open(Cursor::new(bytes)).unwrap();
        assert!(transport.next_tag().unwrap().unwrap().is_audio());
        let err = transport.next_tag().unwrap_err();
        assert!(matches!(err, Error::Truncated { context: "tag header", .. }));
    }

    #[test]
    fn test_partial_previous_tag_size_is_truncated() {
        let mut bytes = flv_header();
        bytes.extend_from_slice(&[0, 0]);

        let mut transport = FlvTransport::open(Cursor::new(bytes)).unwrap();
        let err = transport.next_tag().unwrap_err();
        assert!(matches!(err, Error::Truncated { context: "previous tag size", .. }));
    }

    #[test]
    fn test_partial_tag_header_is_truncated() {
        let mut bytes = flv_header();
        bytes.extend_from_slice(&[0, 0, 0, 0, 9, 0, 0]);

        let mut transport = FlvTransport::open(Cursor::new(bytes)).unwrap();
        let err = transport.next_tag().unwrap_err();
        assert!(matches!(err, Error::Truncated { context: "tag header", .. }));
    }

    #[test]
    fn test_short_payload_is_never_returned() {
        let mut bytes = flv_header();
        push_tag(&mut bytes, 9, 0, &[0u8; 10]);
        bytes.truncate(bytes.len() - 5);

        let mut transport = FlvTransport::open(Cursor::new(bytes)).unwrap();
        let err = transport.next_tag().unwrap_err();
        assert!(matches!(err, Error::Truncated { context: "tag payload", .. }));
        assert!(err.is_io_error());
    }

    #[test]
    fn test_source_failure_mid_tag_is_propagated() {
        let mut bytes = flv_header();
        bytes.extend_from_slice(&[0, 0, 0, 0, 9, 0, 0, 8]);

        let mut transport = FlvTransport::open(Failing(Cursor::new(bytes))).unwrap();
        match transport.next_tag().unwrap_err() {
            Error::Truncated { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::ConnectionReset)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_zero_sized_tag() {
        let mut bytes = flv_header();
        push_tag(&mut bytes, 18, 7, &[]);

        let mut transport = FlvTransport::open(Cursor::new(bytes)).unwrap();
        let tag = transport.next_tag().unwrap().unwrap();
        assert!(tag.is_data());
        assert!(tag.data.is_empty());
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut bytes = flv_header();
        push_tag(&mut bytes, 9, 0, &[1]);
        bytes.extend_from_slice(&[0, 0, 0, 0, 9, 0, 0, 3]);

        let transport = FlvTransport::open(Cursor::new(bytes)).unwrap();
        let results: Vec<_> = transport.collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_close_closes_source_once() {
        let (source, closes) = Tracked::new(flv_header());
        let transport = FlvTransport::open(source).unwrap();
        transport.close().unwrap();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_drop_closes_source() {
        let (source, closes) = Tracked::new(flv_header());
        {
            let mut transport = FlvTransport::open(source).unwrap();
            assert!(transport.next_tag().unwrap().is_none());
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_open_failure_closes_source() {
        let (source, closes) = Tracked::new(b"XLV\x01\x00\x00\x00\x00\x09".to_vec());
        let err = FlvTransport::open(source).unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(closes.get(), 1);
    }
}
