//! The synchronization hub.
//!
//! 同步中心：把本地或对端的变更转换为广播，并抑制回显与重复。
//!
//! Single authority for turning a change into a broadcast. Both directions
//! funnel through the same dedup compare against the last broadcast content,
//! and the compare, the clipboard apply, the update of that content and the
//! fan-out all happen under one lock, so two near-simultaneous identical
//! updates cannot both broadcast. Clipboard and image-file I/O runs on the
//! blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use cy_core::ports::{ClipboardPort, ImageSinkPort, LocalChangeHandler, NotifierPort, PeerSink};
use cy_core::errors::ImageSinkError;
use cy_core::{ClipboardError, ClipboardSnapshot, ConnectionId, DecodeError, WireCodec};

use crate::registry::{BroadcastReport, ConnectionRegistry};

/// What happened to an inbound peer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Applied locally and forwarded to every other peer.
    Applied(BroadcastReport),
    /// Same as the last broadcast content; dropped silently.
    Duplicate,
    /// Not decodable; dropped, sender stays connected.
    Rejected(DecodeError),
    /// Clipboard or image sink refused the content; nothing changed.
    ApplyFailed,
}

/// What happened to a local clipboard change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalOutcome {
    Broadcast(BroadcastReport),
    Duplicate,
    /// The active codec has no encoding for this content.
    NoContent,
}

/// Helper for constructing the hub with explicit dependency fields.
pub struct SyncHubDeps {
    pub registry: Arc<ConnectionRegistry>,
    pub clipboard: Arc<dyn ClipboardPort>,
    pub codec: Arc<dyn WireCodec>,
    pub notifier: Arc<dyn NotifierPort>,
    pub image_sink: Option<Arc<dyn ImageSinkPort>>,
}

pub struct SyncHub {
    registry: Arc<ConnectionRegistry>,
    clipboard: Arc<dyn ClipboardPort>,
    codec: Arc<dyn WireCodec>,
    notifier: Arc<dyn NotifierPort>,
    image_sink: Option<Arc<dyn ImageSinkPort>>,
    /// Last sent or applied content, used solely for dedup.
    last: Mutex<Option<ClipboardSnapshot>>,
}

impl SyncHub {
    pub fn from_deps(deps: SyncHubDeps) -> Self {
        let SyncHubDeps {
            registry,
            clipboard,
            codec,
            notifier,
            image_sink,
        } = deps;

        Self {
            registry,
            clipboard,
            codec,
            notifier,
            image_sink,
            last: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn clipboard(&self) -> &Arc<dyn ClipboardPort> {
        &self.clipboard
    }

    pub async fn last_content(&self) -> Option<ClipboardSnapshot> {
        self.last.lock().await.clone()
    }

    /// Register a newly accepted peer.
    pub async fn connect_peer(&self, id: ConnectionId, sink: Arc<dyn PeerSink>) -> usize {
        let total = self.registry.add(id.clone(), sink).await;
        info!(peer = %id, peers = total, "peer connected");
        self.notifier
            .notify("Device Connected", &format!("Total devices: {total}"));
        total
    }

    /// Deregister a peer whose read loop ended.
    ///
    /// Silent when the peer was already gone: a failed write announced it
    /// when it was dropped, and teardown closes everyone at once.
    pub async fn disconnect_peer(&self, id: &ConnectionId) {
        if let Some(total) = self.registry.remove(id).await {
            self.announce_disconnect(id, total);
        }
    }

    fn announce_disconnect(&self, id: &ConnectionId, total: usize) {
        info!(peer = %id, peers = total, "peer disconnected");
        self.notifier
            .notify("Device Disconnected", &format!("Total devices: {total}"));
    }

    async fn fan_out(&self, excluded: Option<&ConnectionId>, message: &str) -> BroadcastReport {
        let report = self.registry.broadcast(excluded, message).await;
        for id in &report.dropped {
            self.announce_disconnect(id, report.remaining);
        }
        report
    }

    /// Handle a message received from peer `from`.
    pub async fn handle_inbound(&self, from: &ConnectionId, message: &str) -> InboundOutcome {
        let snapshot = match self.codec.decode(message) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(peer = %from, error = %e, "dropping undecodable message");
                self.notify_decode_error(&e);
                return InboundOutcome::Rejected(e);
            }
        };

        let mut last = self.last.lock().await;
        if last.as_ref() == Some(&snapshot) {
            debug!(peer = %from, content = %snapshot, "duplicate of last content, skipping");
            return InboundOutcome::Duplicate;
        }

        if !self.apply(&snapshot).await {
            return InboundOutcome::ApplyFailed;
        }

        info!(peer = %from, content = %snapshot, "clipboard updated from peer");
        *last = Some(snapshot);
        let report = self.fan_out(Some(from), message).await;
        InboundOutcome::Applied(report)
    }

    /// Handle a change observed on the local clipboard.
    pub async fn handle_local_change(&self, snapshot: ClipboardSnapshot) -> LocalOutcome {
        let wire = self.codec.encode(&snapshot);
        if wire.is_empty() {
            debug!(content = %snapshot, "no wire encoding for local content");
            return LocalOutcome::NoContent;
        }

        let mut last = self.last.lock().await;
        if last.as_ref() == Some(&snapshot) {
            debug!(content = %snapshot, "local change equals last content, skipping");
            return LocalOutcome::Duplicate;
        }

        *last = Some(snapshot);
        let report = self.fan_out(None, &wire).await;
        info!(
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "broadcast local clipboard update"
        );
        LocalOutcome::Broadcast(report)
    }

    /// Write to the OS clipboard, persisting images first.
    async fn apply(&self, snapshot: &ClipboardSnapshot) -> bool {
        if let (ClipboardSnapshot::Image(png), Some(sink)) = (snapshot, &self.image_sink) {
            let sink = sink.clone();
            let png = png.clone();
            let persisted = tokio::task::spawn_blocking(move || sink.persist(&png))
                .await
                .unwrap_or_else(|e| Err(ImageSinkError::Io(std::io::Error::other(e))));
            match persisted {
                Ok(path) => {
                    info!(path = %path.display(), "image saved");
                    self.notifier
                        .notify("Image Received", "Image saved to the Clipboard and Desktop.");
                }
                Err(e) => {
                    warn!(error = %e, "failed to save image");
                    self.notifier
                        .notify("Image Error", "Failed to save image to file. Must be PNG");
                    return false;
                }
            }
        }

        let clipboard = self.clipboard.clone();
        let owned = snapshot.clone();
        let written = tokio::task::spawn_blocking(move || clipboard.write(&owned))
            .await
            .unwrap_or_else(|e| Err(ClipboardError::Write(e.to_string())));
        if let Err(e) = written {
            warn!(error = %e, content = %snapshot, "failed to write clipboard");
            let message = if snapshot.is_image() {
                "Failed to copy image to clipboard."
            } else {
                "Failed to update clipboard text."
            };
            self.notifier.notify("Clipboard Error", message);
            return false;
        }
        true
    }

    fn notify_decode_error(&self, error: &DecodeError) {
        match error {
            DecodeError::MissingTag => self
                .notifier
                .notify("Unsupported Message", "Received content without a text: or image: tag."),
            DecodeError::InvalidBase64(_) | DecodeError::UnsupportedFormat => self
                .notifier
                .notify("Image Error", "Wrong image format received. Must be PNG."),
        }
    }
}

#[async_trait]
impl LocalChangeHandler for SyncHub {
    async fn seed(&self, snapshot: Option<ClipboardSnapshot>) {
        if let Some(snapshot) = snapshot {
            debug!(content = %snapshot, "seeding last content");
            *self.last.lock().await = Some(snapshot);
        }
    }

    async fn on_local_change(&self, snapshot: ClipboardSnapshot) -> anyhow::Result<()> {
        self.handle_local_change(snapshot).await;
        Ok(())
    }
}
