use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cy_core::ports::{PeerConnection, PeerListener, PeerTransportPort};
use cy_core::{BindError, ConnectionId, TransportError};

use super::connection::{WsSink, WsStream};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const READY_QUEUE: usize = 32;

/// Serves peers at `ws://<addr><path>`.
#[derive(Debug, Clone)]
pub struct WsTransport {
    path: Arc<str>,
}

impl WsTransport {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Arc::from(path.into()),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl PeerTransportPort for WsTransport {
    async fn bind(&self, addr: SocketAddr) -> Result<Box<dyn PeerListener>, BindError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::AddrInUse => BindError::AddrInUse(addr),
            _ => BindError::Io(e.to_string()),
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| BindError::Io(e.to_string()))?;
        info!(%local_addr, path = %self.path, "websocket listener bound");

        let (ready_tx, ready_rx) = mpsc::channel(READY_QUEUE);
        Ok(Box::new(WsListener {
            listener,
            local_addr,
            path: self.path.clone(),
            ready_tx,
            ready_rx,
            cancel: CancellationToken::new(),
        }))
    }
}

/// A bound socket. Dropping it releases the port and aborts pending
/// handshakes.
pub struct WsListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    path: Arc<str>,
    ready_tx: mpsc::Sender<PeerConnection>,
    ready_rx: mpsc::Receiver<PeerConnection>,
    cancel: CancellationToken,
}

impl Drop for WsListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl PeerListener for WsListener {
    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    async fn accept(&mut self) -> Result<PeerConnection, TransportError> {
        loop {
            tokio::select! {
                Some(connection) = self.ready_rx.recv() => return Ok(connection),
                accepted = self.listener.accept() => {
                    let (stream, remote) =
                        accepted.map_err(|e| TransportError::Io(e.to_string()))?;
                    debug!(%remote, "tcp connection accepted");
                    tokio::spawn(handshake(
                        stream,
                        remote,
                        self.path.clone(),
                        self.ready_tx.clone(),
                        self.cancel.child_token(),
                    ));
                }
            }
        }
    }
}

async fn handshake(
    stream: TcpStream,
    remote: SocketAddr,
    path: Arc<str>,
    ready: mpsc::Sender<PeerConnection>,
    cancel: CancellationToken,
) {
    let check_path = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        if request.uri().path() == &*path {
            Ok(response)
        } else {
            warn!(%remote, path = request.uri().path(), "rejecting upgrade for unknown path");
            Err(not_found())
        }
    };

    let upgrade = tokio::time::timeout(
        HANDSHAKE_TIMEOUT,
        tokio_tungstenite::accept_hdr_async(stream, check_path),
    );
    let ws = tokio::select! {
        _ = cancel.cancelled() => return,
        result = upgrade => match result {
            Ok(Ok(ws)) => ws,
            Ok(Err(e)) => {
                debug!(%remote, error = %e, "websocket handshake failed");
                return;
            }
            Err(_) => {
                warn!(%remote, "websocket handshake timed out");
                return;
            }
        },
    };

    let (write, read) = ws.split();
    let connection = PeerConnection {
        id: ConnectionId::new(),
        remote: Some(remote),
        sink: Arc::new(WsSink::new(write)),
        stream: Box::new(WsStream::new(read)),
    };
    info!(peer = %connection.id, %remote, "websocket connection established");

    tokio::select! {
        _ = cancel.cancelled() => {}
        sent = ready.send(connection) => {
            if sent.is_err() {
                debug!(%remote, "listener closed before connection was accepted");
            }
        }
    }
}

fn not_found() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("Not Found".to_string()));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}
