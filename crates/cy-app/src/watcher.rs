//! Clipboard watcher
//!
//! A cancellable polling loop that samples the local clipboard through
//! [`ClipboardPort`] and reports changes to a [`LocalChangeHandler`].
//!
//! ```text
//! Local Clipboard
//!      ↓
//! ClipboardPort
//!      ↓
//! ClipboardWatcher   (this module)
//!      ↓
//! LocalChangeHandler (SyncHub)
//! ```
//!
//! ## Lifecycle
//!
//! On start the watcher reads the clipboard once and seeds the handler with
//! it, so content already present is never broadcast. It then polls at a
//! fixed interval. While the server is `Paused` it idles on the state
//! channel without polling; only its cancellation token makes it exit. A
//! stopped watcher is never restarted: the controller spawns a new one.
//!
//! Each sample runs on the blocking pool, since the OS clipboard call may
//! round-trip to the display server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cy_core::ports::{ClipboardPort, LocalChangeHandler};
use cy_core::{ClipboardSnapshot, ServerState};

pub struct ClipboardWatcher {
    clipboard: Arc<dyn ClipboardPort>,
    handler: Arc<dyn LocalChangeHandler>,
    interval: Duration,
    state: watch::Receiver<ServerState>,
    cancel: CancellationToken,
    last_seen: Option<ClipboardSnapshot>,
}

impl ClipboardWatcher {
    pub fn new(
        clipboard: Arc<dyn ClipboardPort>,
        handler: Arc<dyn LocalChangeHandler>,
        interval: Duration,
        state: watch::Receiver<ServerState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            clipboard,
            handler,
            interval,
            state,
            cancel,
            last_seen: None,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        let initial = self.read().await;
        if let Some(snapshot) = &initial {
            info!(content = %snapshot, "initial clipboard content");
        }
        self.handler.seed(initial.clone()).await;
        self.last_seen = initial;

        loop {
            if *self.state.borrow_and_update() == ServerState::Paused {
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    changed = self.state.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            if *self.state.borrow() == ServerState::Paused {
                continue;
            }
            self.check_once().await;
        }

        info!("clipboard watcher stopped");
    }

    /// Sample the clipboard once, reporting it if it changed since the last
    /// sample.
    pub async fn check_once(&mut self) {
        let Some(current) = self.read().await else {
            return;
        };
        if self.last_seen.as_ref() == Some(&current) {
            return;
        }

        debug!(content = %current, "local clipboard changed");
        self.last_seen = Some(current.clone());
        if let Err(e) = self.handler.on_local_change(current).await {
            warn!(error = %e, "failed to handle local clipboard change");
        }
    }

    async fn read(&self) -> Option<ClipboardSnapshot> {
        let clipboard = self.clipboard.clone();
        match tokio::task::spawn_blocking(move || clipboard.read()).await {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                warn!(error = %e, "failed to read clipboard");
                None
            }
            Err(e) => {
                warn!(error = %e, "clipboard read task failed");
                None
            }
        }
    }
}
