//! Port interfaces for the application layer
//!
//! Ports define the contract between the sync core (`cy-app`) and the
//! infrastructure implementations in `cy-platform` and `cy-network`. The hub
//! only ever talks to these traits, so every collaborator can be replaced by
//! an in-memory fake in tests.
//!
//! ## Port Placement Guidelines
//!
//! Before adding a new port here, ask:
//!
//! 1. **Does this port represent a capability the hub needs?**
//! 2. **Is it implemented by the platform or network layer?**
//!
//! If both answers are **yes**, place it in `cy-core/ports`.

pub mod app_dirs;
mod clipboard;
mod image_sink;
mod local_change;
mod notifier;
pub mod transport;

pub use app_dirs::{AppDirs, AppDirsPort};
pub use clipboard::ClipboardPort;
pub use image_sink::ImageSinkPort;
pub use local_change::LocalChangeHandler;
pub use notifier::NotifierPort;
pub use transport::{PeerConnection, PeerListener, PeerSink, PeerStream, PeerTransportPort};
