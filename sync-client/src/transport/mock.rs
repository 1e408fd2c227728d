//! Mock transport for testing.
//!
//! Allows queueing inbound buffers, capturing sent buffers, forcing
//! failures, and linking two mocks into an in-process peer pair.

use super::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, Weak};

/// Mock transport for testing.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    peers: BTreeSet<String>,
    sent_messages: Vec<Vec<u8>>,
    receive_queue: VecDeque<Vec<u8>>,
    link: Option<Weak<Mutex<MockTransportInner>>>,
    fail_next_connect: Option<String>,
    fail_next_send: Option<String>,
    fail_next_recv: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create two linked transports: whatever one sends, the other receives.
    ///
    /// The link does not keep the peer alive; sending after the peer is
    /// dropped delivers nothing.
    pub fn pair() -> (Self, Self) {
        let a = Self::new();
        let b = Self::new();
        a.inner.lock().unwrap().link = Some(Arc::downgrade(&b.inner));
        b.inner.lock().unwrap().link = Some(Arc::downgrade(&a.inner));
        (a, b)
    }

    /// Queue a buffer to be returned by the next `recv()` call.
    pub fn queue_response(&self, data: Vec<u8>) {
        let mut inner = self.inner.lock().unwrap();
        inner.receive_queue.push_back(data);
    }

    /// Get all buffers that were sent.
    pub fn sent_messages(&self) -> Vec<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.sent_messages.clone()
    }

    /// Get the last buffer that was sent.
    pub fn last_sent(&self) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.sent_messages.last().cloned()
    }

    /// Cause the next connect() to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_connect = Some(error.to_string());
    }

    /// Cause the next send() to fail with the given error.
    pub fn fail_next_send(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_send = Some(error.to_string());
    }

    /// Cause the next recv() to fail with the given error.
    pub fn fail_next_recv(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_recv = Some(error.to_string());
    }

    /// Drop a peer as if it walked out of range.
    pub fn drop_peer(&self, address: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.peers.remove(address);
    }

    /// Clear all state (messages, queue, peers). Links are kept.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        let link = inner.link.take();
        *inner = MockTransportInner {
            link,
            ..MockTransportInner::default()
        };
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, address: &str) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();

        // Check for forced failure
        if let Some(error) = inner.fail_next_connect.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        inner.peers.insert(address.to_string());
        Ok(())
    }

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let link = {
            let mut inner = self.inner.lock().unwrap();

            if inner.peers.is_empty() {
                return Err(TransportError::NotConnected);
            }

            // Check for forced failure
            if let Some(error) = inner.fail_next_send.take() {
                return Err(TransportError::SendFailed(error));
            }

            inner.sent_messages.push(data.to_vec());
            inner.link.as_ref().and_then(Weak::upgrade)
        };

        // Own lock is released before touching the peer's
        if let Some(link) = link {
            link.lock().unwrap().receive_queue.push_back(data.to_vec());
        }
        Ok(())
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.peers.is_empty() {
            return Err(TransportError::NotConnected);
        }

        // Check for forced failure
        if let Some(error) = inner.fail_next_recv.take() {
            return Err(TransportError::ReceiveFailed(error));
        }

        inner
            .receive_queue
            .pop_front()
            .ok_or(TransportError::ConnectionClosed)
    }

    fn connected_peers(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.peers.iter().cloned().collect()
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.peers.clear();
        Ok(())
    }
}
