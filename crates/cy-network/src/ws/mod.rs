//! WebSocket transport.
//!
//! ```text
//! TcpListener ── accept ──> handshake task (path check, 404 otherwise)
//!                                │
//!                                ▼
//!                     ready queue ──> WsListener::accept() ──> PeerConnection
//!                                                               ├── WsSink   (write half)
//!                                                               └── WsStream (read half)
//! ```
//!
//! Handshakes run concurrently so one slow client cannot stall the accept
//! loop. Every text frame is one wire message; binary frames are accepted
//! when they hold UTF-8.

mod connection;
mod listener;

pub use connection::{WsSink, WsStream};
pub use listener::{WsListener, WsTransport};

use cy_core::TransportError;
use tokio_tungstenite::tungstenite;

pub(crate) fn map_ws_error(error: tungstenite::Error) -> TransportError {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Closed
        }
        tungstenite::Error::Io(e) => TransportError::Io(e.to_string()),
        other => TransportError::Protocol(other.to_string()),
    }
}
