use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::debug;

use cy_core::ports::{PeerSink, PeerStream};
use cy_core::TransportError;

use super::map_ws_error;

/// Upper bound for one frame write; a stalled peer is treated as failed.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for the close handshake. A peer that stopped reading never
/// drains the close frame, so the socket is abandoned once this elapses.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

type WsWriteHalf = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsReadHalf = SplitStream<WebSocketStream<TcpStream>>;

pub struct WsSink {
    inner: Mutex<WsWriteHalf>,
}

impl WsSink {
    pub(crate) fn new(inner: WsWriteHalf) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }
}

#[async_trait]
impl PeerSink for WsSink {
    async fn send(&self, message: &str) -> Result<(), TransportError> {
        let mut sink = self.inner.lock().await;
        match tokio::time::timeout(SEND_TIMEOUT, sink.send(Message::text(message))).await {
            Ok(result) => result.map_err(map_ws_error),
            Err(_) => Err(TransportError::Io("write timed out".to_string())),
        }
    }

    async fn close(&self) {
        let closing = async {
            let mut sink = self.inner.lock().await;
            sink.close().await
        };
        match tokio::time::timeout(CLOSE_TIMEOUT, closing).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "close handshake failed"),
            Err(_) => debug!("close handshake timed out, abandoning connection"),
        }
    }
}

pub struct WsStream {
    inner: WsReadHalf,
}

impl WsStream {
    pub(crate) fn new(inner: WsReadHalf) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl PeerStream for WsStream {
    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            let frame = match self.inner.next().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(map_ws_error(e))),
            };

            match frame {
                Message::Text(text) => return Some(Ok(text.as_str().to_owned())),
                Message::Binary(bytes) => {
                    return Some(String::from_utf8(bytes.to_vec()).map_err(|_| {
                        TransportError::Protocol("binary frame is not UTF-8".to_string())
                    }))
                }
                Message::Close(_) => return None,
                // Control frames are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}
