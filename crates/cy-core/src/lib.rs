//! # cy-core
//!
//! Core domain models and ports for Clipy clipboard sync.
//!
//! This crate contains pure domain logic without any infrastructure dependencies:
//! the clipboard snapshot model, the `text:`/`image:` wire codec, the server
//! lifecycle states, and the port traits implemented by the platform and
//! network layers.

pub mod clipboard;
pub mod config;
pub mod errors;
pub mod ids;
pub mod lifecycle;
pub mod ports;

// Re-export commonly used types at the crate root
pub use clipboard::{ClipboardSnapshot, TaggedCodec, TextOnlyCodec, WireCodec};
pub use config::AppConfig;
pub use errors::{BindError, ClipboardError, DecodeError, TransportError};
pub use ids::ConnectionId;
pub use lifecycle::{LifecycleOutcome, ServerState};
