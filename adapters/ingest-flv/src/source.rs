//! Byte sources an [`FlvTransport`](crate::FlvTransport) can own
//!
//! Every source is readable. Closing is an optional capability: the provided
//! [`Source::close`] does nothing, and sources holding a resource that needs an
//! explicit release (sockets, wrappers around them) override it. The transport
//! only calls it when it is closed or dropped.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Stdin};
use std::net::{Shutdown, TcpStream};
use std::process::ChildStdout;

/// A blocking byte source with an optional close capability
pub trait Source: Read {
    /// Release the underlying resource
    ///
    /// Called at most once by the owning transport. The default is a no-op for
    /// sources that have nothing to release beyond their own `Drop`.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Source for File {}

impl Source for Stdin {}

impl Source for ChildStdout {}

impl Source for &[u8] {}

impl<T: AsRef<[u8]>> Source for Cursor<T> {}

impl Source for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            // Peer already hung up
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

impl<S: Source> Source for BufReader<S> {
    fn close(&mut self) -> io::Result<()> {
        self.get_mut().close()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
