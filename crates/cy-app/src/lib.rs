//! # cy-app
//!
//! The clipboard sync core: connection registry, sync hub, clipboard
//! watcher, accept/read loops and the lifecycle controller. Everything here
//! talks to the outside world through `cy-core` ports only.

pub mod hub;
pub mod lifecycle;
pub mod registry;
pub mod session;
pub mod watcher;

pub use hub::{InboundOutcome, LocalOutcome, SyncHub, SyncHubDeps};
pub use lifecycle::{
    HubStatus, LifecycleController, LifecycleDeps, LifecycleError, LifecycleSettings,
};
pub use registry::{BroadcastReport, ConnectionRegistry};
pub use watcher::ClipboardWatcher;
