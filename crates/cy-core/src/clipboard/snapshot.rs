use std::fmt;

/// One immutable, comparable view of clipboard content.
///
/// 剪贴板内容的不可变快照。
///
/// Equality is structural: string equality for text, byte-for-byte for
/// images. Images are always PNG encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClipboardSnapshot {
    Text(String),
    Image(Vec<u8>),
}

impl ClipboardSnapshot {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn png(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Image(bytes.into())
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Image(bytes) => bytes.len(),
        }
    }
}

/// Summary suitable for logs; never prints the payload itself.
impl fmt::Display for ClipboardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({} bytes)", self.kind(), self.size_bytes())
    }
}
