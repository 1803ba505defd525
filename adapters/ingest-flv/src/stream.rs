//! Async bridge from a blocking transport into a pipeline
//!
//! The transport's reads block, so it runs on a tokio blocking worker that
//! owns it exclusively. Tags are forwarded through a bounded channel; the
//! worker closes the transport whenever it exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::source::Source;
use crate::tag::Tag;
use crate::transport::FlvTransport;

/// Stream of tags read by a background worker
///
/// Yields every tag in stream order, then `None` after a clean end of stream.
/// If a read fails the error is delivered once and the stream ends.
pub struct FlvTagStream {
    rx: mpsc::Receiver<Result<Tag>>,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FlvTagStream {
    /// Move `transport` onto a blocking worker and start reading
    ///
    /// `capacity` bounds the number of tags buffered ahead of the consumer.
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(transport: FlvTransport<S>, capacity: usize) -> Self
    where
        S: Source + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let stopped = Arc::new(AtomicBool::new(false));
        let worker_stopped = Arc::clone(&stopped);

        let worker = tokio::task::spawn_blocking(move || {
            read_loop(transport, tx, worker_stopped);
        });

        Self {
            rx,
            stopped,
            worker: Some(worker),
        }
    }

    /// Receive the next tag
    pub async fn recv(&mut self) -> Option<Result<Tag>> {
        self.rx.recv().await
    }

    /// Ask the worker to stop after its current read
    ///
    /// Tags already buffered remain available to [`recv`](Self::recv), after
    /// which it returns `None`. The worker closes the transport before the
    /// stream ends.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Stop the worker and wait for it to close the transport
    ///
    /// The flag is only checked between reads. A worker blocked reading a
    /// source that never delivers more data keeps this future pending until
    /// the read returns. For network sources, keep a cloned handle (e.g.
    /// [`TcpStream::try_clone`](std::net::TcpStream::try_clone)) and shut it
    /// down to wake the worker.
    pub async fn shutdown(mut self) {
        self.stop();
        // Unblock a worker waiting for channel capacity
        self.rx.close();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                tracing::warn!("FLV reader task failed: {}", e);
            }
        }
    }
}

fn read_loop<S: Source>(
    mut transport: FlvTransport<S>,
    tx: mpsc::Sender<Result<Tag>>,
    stopped: Arc<AtomicBool>,
) {
    loop {
        if stopped.load(Ordering::SeqCst) {
            tracing::info!("FLV reader stopped by request");
            break;
        }

        match transport.next_tag() {
            Ok(Some(tag)) => {
                if tx.blocking_send(Ok(tag)).is_err() {
                    tracing::debug!("Tag channel closed");
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("FLV read error: {}", e);
                let _ = tx.blocking_send(Err(e));
                break;
            }
        }
    }

    let tags = transport.tags_read();
    if let Err(e) = transport.close() {
        tracing::warn!("Failed to close FLV transport: {}", e);
    }
    tracing::debug!(tags, "FLV reader finished");
}
