use std::path::PathBuf;

use crate::errors::ImageSinkError;

/// Persists received PNG payloads.
///
/// A side effect of applying an image snapshot; returns where it was written.
pub trait ImageSinkPort: Send + Sync {
    fn persist(&self, png: &[u8]) -> Result<PathBuf, ImageSinkError>;
}
