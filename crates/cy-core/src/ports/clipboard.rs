use crate::clipboard::ClipboardSnapshot;
use crate::errors::ClipboardError;

/// Read/write access to the OS clipboard.
///
/// 系统剪贴板读写端口。
///
/// `read` returns `Ok(None)` when the clipboard is empty or holds only
/// formats this port does not carry.
pub trait ClipboardPort: Send + Sync {
    fn read(&self) -> Result<Option<ClipboardSnapshot>, ClipboardError>;

    fn write(&self, snapshot: &ClipboardSnapshot) -> Result<(), ClipboardError>;
}
