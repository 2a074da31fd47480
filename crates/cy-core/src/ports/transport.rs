//! Peer transport ports.
//!
//! A transport binds a listener; the listener yields accepted connections,
//! each split into a shared write half ([`PeerSink`], owned by the registry)
//! and an exclusive read half ([`PeerStream`], owned by the connection's read
//! loop).

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{BindError, TransportError};
use crate::ids::ConnectionId;

/// Write half of a peer connection.
#[async_trait]
pub trait PeerSink: Send + Sync {
    /// Send one text message to the peer.
    async fn send(&self, message: &str) -> Result<(), TransportError>;

    /// Close the connection. Idempotent.
    async fn close(&self);
}

/// Read half of a peer connection.
#[async_trait]
pub trait PeerStream: Send {
    /// Wait for the next text message.
    ///
    /// `None` means the peer closed the connection cleanly. Must be
    /// cancel-safe: dropping the future before it completes loses no message.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;
}

/// A freshly accepted peer.
pub struct PeerConnection {
    pub id: ConnectionId,
    pub remote: Option<SocketAddr>,
    pub sink: Arc<dyn PeerSink>,
    pub stream: Box<dyn PeerStream>,
}

impl std::fmt::Debug for PeerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerConnection")
            .field("id", &self.id)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

/// A bound listening endpoint. Dropping it releases the socket.
#[async_trait]
pub trait PeerListener: Send {
    fn local_addr(&self) -> SocketAddr;

    /// Wait for the next peer that completed the channel handshake.
    async fn accept(&mut self) -> Result<PeerConnection, TransportError>;
}

/// Factory for listeners.
#[async_trait]
pub trait PeerTransportPort: Send + Sync {
    async fn bind(&self, addr: SocketAddr) -> Result<Box<dyn PeerListener>, BindError>;
}
