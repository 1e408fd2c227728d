//! File-drop transport.
//!
//! Carries a package through a file handed between devices (AirDrop,
//! USB stick, mail attachment). Sending writes the outbox file; receiving
//! reads the inbox file once.

use async_trait::async_trait;
use monthsync_client::{Transport, TransportError, MAX_PACKAGE_SIZE};
use std::path::PathBuf;
use std::sync::Mutex;

/// Transport backed by files on disk.
#[derive(Debug, Default)]
pub struct FileTransport {
    outbox: Option<PathBuf>,
    inbox: Option<PathBuf>,
    peer: Mutex<Option<String>>,
}

impl FileTransport {
    /// Transport that writes outgoing packages to `path`.
    pub fn outbox(path: impl Into<PathBuf>) -> Self {
        Self {
            outbox: Some(path.into()),
            ..Self::default()
        }
    }

    /// Transport that reads one incoming package from `path`.
    pub fn inbox(path: impl Into<PathBuf>) -> Self {
        Self {
            inbox: Some(path.into()),
            ..Self::default()
        }
    }

    fn peer(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.peer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn connect(&self, address: &str) -> Result<(), TransportError> {
        if let Some(inbox) = &self.inbox {
            if !inbox.exists() {
                return Err(TransportError::ConnectionFailed(format!(
                    "{} does not exist",
                    inbox.display()
                )));
            }
        }
        *self.peer() = Some(address.to_string());
        Ok(())
    }

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        if self.peer().is_none() {
            return Err(TransportError::NotConnected);
        }
        let outbox = self
            .outbox
            .as_ref()
            .ok_or_else(|| TransportError::SendFailed("no outbox file".to_string()))?;
        tokio::fs::write(outbox, data)
            .await
            .map_err(|e| TransportError::SendFailed(format!("{}: {}", outbox.display(), e)))
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        if self.peer().is_none() {
            return Err(TransportError::NotConnected);
        }
        let inbox = self
            .inbox
            .as_ref()
            .ok_or(TransportError::ConnectionClosed)?;

        let metadata = tokio::fs::metadata(inbox)
            .await
            .map_err(|e| TransportError::ReceiveFailed(format!("{}: {}", inbox.display(), e)))?;
        if metadata.len() > MAX_PACKAGE_SIZE as u64 {
            // Report the size without reading the whole file
            return Err(TransportError::ReceiveFailed(format!(
                "{} is {} bytes (max {})",
                inbox.display(),
                metadata.len(),
                MAX_PACKAGE_SIZE
            )));
        }

        tokio::fs::read(inbox)
            .await
            .map_err(|e| TransportError::ReceiveFailed(format!("{}: {}", inbox.display(), e)))
    }

    fn connected_peers(&self) -> Vec<String> {
        self.peer().iter().cloned().collect()
    }

    async fn close(&self) -> Result<(), TransportError> {
        *self.peer() = None;
        Ok(())
    }
}
