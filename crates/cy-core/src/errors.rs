//! Error taxonomy shared by the hub and its adapters.
//!
//! 错误分类：传输、解码、剪贴板、监听绑定。

use std::net::SocketAddr;

use thiserror::Error;

/// Inbound payload could not be turned into a snapshot.
///
/// Non-fatal: the message is dropped and the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("message is not tagged with `text:` or `image:`")]
    MissingTag,

    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("unsupported image format, only PNG is accepted")]
    UnsupportedFormat,
}

/// Connection read/write failure.
///
/// Non-fatal: the connection is closed and removed from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("connection I/O error: {0}")]
    Io(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// The listening socket could not be acquired.
///
/// Fatal to the `start` attempt only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("address {0} is already in use")]
    AddrInUse(SocketAddr),

    #[error("failed to bind listener: {0}")]
    Io(String),
}

/// OS clipboard access failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read clipboard: {0}")]
    Read(String),

    #[error("failed to write clipboard: {0}")]
    Write(String),
}

#[derive(Debug, Error)]
pub enum ImageSinkError {
    #[error("image output directory unavailable")]
    DirUnavailable,

    #[error("failed to persist image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppDirsError {
    #[error("data-local directory unavailable")]
    DataLocalDirUnavailable,

    #[error("config directory unavailable")]
    ConfigDirUnavailable,
}
