//! Byte transports carrying framed messages between pipeline stages.
//!
//! A transport moves opaque bytes; framing, authentication and timeouts live
//! in [`crate::Exchange`]. Reads may return any chunking of what the peer
//! wrote, so the exchange reassembles frames itself.

use std::future::Future;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// Bidirectional byte stream to one peer.
///
/// # Invariants
///
/// - Bytes arrive in the order they were written
/// - `read` returns a non-empty chunk, or an error once the peer is gone
pub trait Transport: Send {
    /// Write all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Wait for the next chunk of bytes.
    ///
    /// Must be cancel-safe: dropping the future loses no data.
    fn read(&mut self) -> impl Future<Output = Result<Bytes, TransportError>> + Send;
}

/// In-process transport over bounded channels.
///
/// Used by tests and by stages that run in the same process.
#[derive(Debug)]
pub struct MemoryTransport {
    outgoing: mpsc::Sender<Bytes>,
    incoming: mpsc::Receiver<Bytes>,
}

impl MemoryTransport {
    /// Two connected ends; each buffers up to `capacity` writes.
    pub fn pair(capacity: usize) -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::channel(capacity.max(1));
        let (b_tx, b_rx) = mpsc::channel(capacity.max(1));
        (Self { outgoing: a_tx, incoming: b_rx }, Self { outgoing: b_tx, incoming: a_rx })
    }
}

impl Transport for MemoryTransport {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.outgoing
            .send(Bytes::copy_from_slice(bytes))
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn read(&mut self) -> Result<Bytes, TransportError> {
        self.incoming.recv().await.ok_or(TransportError::Closed)
    }
}
