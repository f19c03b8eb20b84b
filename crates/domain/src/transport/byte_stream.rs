use async_trait::async_trait;

use super::transport_kind::TransportKind;
use crate::error::{ConnectError, IoError};

/// Byte-stream transport that infrastructure implementations must provide
///
/// Reads and writes are only valid between a successful `open` and `close`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Kind of link this transport drives
    fn kind(&self) -> TransportKind;

    /// Human-readable endpoint (address:port, device identifier)
    fn endpoint(&self) -> String;

    /// Establish the underlying OS-level connection
    async fn open(&mut self) -> Result<(), ConnectError>;

    /// Write some bytes, returning how many were accepted
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, IoError>;

    /// Read into `buffer`. Returns 0 when the remote end closed the stream.
    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, IoError>;

    /// Gracefully close. Safe to call on an already-closed transport.
    async fn close(&mut self);

    /// Drop the OS handle without a graceful shutdown (used from `Drop`)
    fn release(&mut self);

    /// Check if the OS handle is currently held
    fn is_connected(&self) -> bool;
}
