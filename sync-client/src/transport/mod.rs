//! Transport abstraction for monthsync.
//!
//! The transport is an external collaborator (Bluetooth, local network,
//! an in-process pair for tests). It owns discovery, connection management
//! and message framing; monthsync only needs whole buffers in and out.
//!
//! # Design
//!
//! The transport trait is async and connection-oriented:
//! - `connect()` establishes a connection to a peer
//! - `send()` transmits one complete package buffer
//! - `recv()` receives one complete package buffer
//! - `connected_peers()` reports the current peer set
//! - `close()` gracefully terminates
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.connect("kitchen-ipad").await?;
//! transport.send(&package_bytes).await?;
//! let incoming = transport.recv().await?;
//! ```

mod mock;

pub use mock::MockTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Largest package buffer a session will decode (1 MiB).
///
/// Twelve events fit in a few kilobytes; anything near this size is not a
/// genuine calendar.
pub const MAX_PACKAGE_SIZE: usize = 1024 * 1024;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed (peer went away mid-session).
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Transport trait for exchanging package buffers with peers.
///
/// Retry and backoff, if any, belong to implementations of this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the peer identified by `address`.
    async fn connect(&self, address: &str) -> Result<(), TransportError>;

    /// Send one complete buffer.
    async fn send(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Receive one complete buffer.
    ///
    /// Blocks until data is available or the connection closes. A buffer is
    /// only returned once fully received.
    async fn recv(&self) -> Result<Vec<u8>, TransportError>;

    /// Currently connected peers.
    fn connected_peers(&self) -> Vec<String>;

    /// Check if any peer is connected.
    fn is_connected(&self) -> bool {
        !self.connected_peers().is_empty()
    }

    /// Close the connection gracefully.
    async fn close(&self) -> Result<(), TransportError>;
}
