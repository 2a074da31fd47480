//! Network adapters for Clipy.
//!
//! 网络层：基于 WebSocket 的对端传输。

pub mod ws;

pub use ws::WsTransport;
