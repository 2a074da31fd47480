//! Live peer connections.
//!
//! 已连接对端的注册表。
//!
//! Every mutation and every broadcast iteration runs under one async mutex,
//! so an add/remove is never observed halfway through a fan-out. A write
//! failure removes the peer inside the same critical section: a peer present
//! in the registry is always writable as of the last broadcast. Removed sinks
//! are closed only after the lock is released, so a peer stuck in its close
//! handshake never blocks the registry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use cy_core::ports::PeerSink;
use cy_core::{ConnectionId, TransportError};

/// Outcome of one fan-out pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Peers the callback succeeded for.
    pub delivered: usize,
    /// Peers whose write failed; already closed and removed.
    pub dropped: Vec<ConnectionId>,
    /// Registry size once the pass finished.
    pub remaining: usize,
}

pub struct ConnectionRegistry {
    peers: Mutex<HashMap<ConnectionId, Arc<dyn PeerSink>>>,
    size_tx: watch::Sender<usize>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        let (size_tx, _) = watch::channel(0);
        Self {
            peers: Mutex::new(HashMap::new()),
            size_tx,
        }
    }

    /// Register a peer. Returns the new size.
    pub async fn add(&self, id: ConnectionId, sink: Arc<dyn PeerSink>) -> usize {
        let (previous, size) = {
            let mut peers = self.peers.lock().await;
            let previous = peers.insert(id.clone(), sink);
            (previous, self.publish(peers.len()))
        };
        if let Some(previous) = previous {
            // Ids are never reused; a collision means a stale handle.
            warn!(peer = %id, "replacing existing registry entry");
            previous.close().await;
        }
        size
    }

    /// Close and drop a peer. Returns the new size, or `None` if it was not
    /// registered.
    pub async fn remove(&self, id: &ConnectionId) -> Option<usize> {
        let (sink, size) = {
            let mut peers = self.peers.lock().await;
            let sink = peers.remove(id)?;
            (sink, self.publish(peers.len()))
        };
        sink.close().await;
        Some(size)
    }

    pub async fn size(&self) -> usize {
        self.peers.lock().await.len()
    }

    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.peers.lock().await.contains_key(id)
    }

    /// Observe the peer count; updated on every mutation.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.size_tx.subscribe()
    }

    /// Invoke `f` for every peer except `excluded` (`None` means all).
    ///
    /// Peers for which `f` fails are removed before the lock is released and
    /// closed right after.
    pub async fn for_each_except<F, Fut>(
        &self,
        excluded: Option<&ConnectionId>,
        mut f: F,
    ) -> BroadcastReport
    where
        F: FnMut(ConnectionId, Arc<dyn PeerSink>) -> Fut,
        Fut: Future<Output = Result<(), TransportError>>,
    {
        let mut peers = self.peers.lock().await;
        let mut failed = Vec::new();

        let targets: Vec<(ConnectionId, Fut)> = peers
            .iter()
            .filter(|(id, _)| Some(*id) != excluded)
            .map(|(id, sink)| (id.clone(), f(id.clone(), sink.clone())))
            .collect();

        let (ids, writes): (Vec<_>, Vec<_>) = targets.into_iter().unzip();
        let results = join_all(writes).await;

        let mut report = BroadcastReport::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(peer = %id, error = %e, "write failed, dropping peer");
                    if let Some(sink) = peers.remove(&id) {
                        failed.push(sink);
                    }
                    report.dropped.push(id);
                }
            }
        }

        report.remaining = peers.len();
        if !report.dropped.is_empty() {
            self.publish(report.remaining);
        }
        drop(peers);

        join_all(failed.iter().map(|sink| sink.close())).await;
        debug!(
            delivered = report.delivered,
            dropped = report.dropped.len(),
            peers = report.remaining,
            "fan-out complete"
        );
        report
    }

    /// Send `message` to every peer except `excluded`.
    pub async fn broadcast(&self, excluded: Option<&ConnectionId>, message: &str) -> BroadcastReport {
        self.for_each_except(excluded, |_, sink| async move { sink.send(message).await })
            .await
    }

    /// Close and remove every peer. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut peers = self.peers.lock().await;
            let drained: Vec<_> = peers.drain().collect();
            self.publish(0);
            drained
        };
        join_all(drained.iter().map(|(id, sink)| {
            debug!(peer = %id, "closing connection");
            sink.close()
        }))
        .await;
        drained.len()
    }

    fn publish(&self, size: usize) -> usize {
        self.size_tx.send_replace(size);
        size
    }
}
