//! OS-facing adapters for the Clipy ports.
//!
//! 平台适配层：剪贴板、图片落盘、通知、局域网地址探测。

pub mod app_dirs;
pub mod clipboard;
pub mod image_sink;
pub mod net_utils;
pub mod notifier;

pub use app_dirs::DirsAppDirsAdapter;
pub use clipboard::LocalClipboard;
pub use image_sink::FileImageSink;
pub use notifier::TracingNotifier;
