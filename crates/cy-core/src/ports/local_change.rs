//! Local clipboard change handler port
//!
//! The watcher (event source) depends on this abstraction; the hub
//! implements it.

use async_trait::async_trait;

use crate::clipboard::ClipboardSnapshot;

/// Receives local clipboard observations from the watcher.
#[async_trait]
pub trait LocalChangeHandler: Send + Sync {
    /// Record the content present when a watcher instance starts, without
    /// broadcasting it.
    async fn seed(&self, snapshot: Option<ClipboardSnapshot>);

    /// Called when the watcher sees content different from what it saw last.
    async fn on_local_change(&self, snapshot: ClipboardSnapshot) -> anyhow::Result<()>;
}
