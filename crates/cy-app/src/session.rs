//! Accept loop and per-connection read loops.
//!
//! Every accepted peer is registered with the hub and gets one read loop
//! that forwards its messages until the connection ends or the session is
//! cancelled. While the server is `Paused` read loops idle instead of
//! reading, so peers cannot push updates during a pause window.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cy_core::ports::{PeerListener, PeerStream};
use cy_core::{ConnectionId, ServerState};

use crate::hub::SyncHub;

/// Pause between retries after a failed accept.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accept peers until `cancel` fires. The listener is dropped (and its socket
/// released) when this returns.
pub async fn run_accept_loop(
    mut listener: Box<dyn PeerListener>,
    hub: Arc<SyncHub>,
    state: watch::Receiver<ServerState>,
    cancel: CancellationToken,
) {
    let addr = listener.local_addr();
    info!(%addr, "accepting peers");

    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok(connection) => {
                let id = connection.id.clone();
                debug!(peer = %id, remote = ?connection.remote, "accepted connection");
                hub.connect_peer(id.clone(), connection.sink).await;

                tokio::spawn(run_read_loop(
                    id,
                    connection.stream,
                    hub.clone(),
                    state.clone(),
                    cancel.clone(),
                ));
            }
            Err(e) => {
                warn!(error = %e, "accept failed");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(ACCEPT_BACKOFF) => {}
                }
            }
        }
    }

    info!(%addr, "listener closed");
}

/// Forward messages from one peer to the hub.
pub async fn run_read_loop(
    id: ConnectionId,
    mut stream: Box<dyn PeerStream>,
    hub: Arc<SyncHub>,
    mut state: watch::Receiver<ServerState>,
    cancel: CancellationToken,
) {
    loop {
        if *state.borrow_and_update() == ServerState::Paused {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = state.changed() => {
                // Re-check the pause gate before reading further.
                if changed.is_err() {
                    break;
                }
            }
            received = stream.recv() => match received {
                Some(Ok(message)) => {
                    let outcome = hub.handle_inbound(&id, &message).await;
                    debug!(peer = %id, ?outcome, "inbound message handled");
                }
                Some(Err(e)) => {
                    warn!(peer = %id, error = %e, "read failed");
                    break;
                }
                None => {
                    debug!(peer = %id, "peer closed connection");
                    break;
                }
            }
        }
    }

    hub.disconnect_peer(&id).await;
}
