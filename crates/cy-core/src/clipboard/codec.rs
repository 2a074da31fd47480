use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;

use super::ClipboardSnapshot;
use crate::errors::DecodeError;

pub const TEXT_PREFIX: &str = "text:";
pub const IMAGE_PREFIX: &str = "image:";

/// Converts snapshots to and from the tagged wire text.
///
/// 快照与线路文本格式之间的转换。
///
/// An empty encoding means "no content" and is never broadcast. Empty text
/// encodes to nothing.
pub trait WireCodec: Send + Sync {
    fn encode(&self, snapshot: &ClipboardSnapshot) -> String;

    fn decode(&self, wire: &str) -> Result<ClipboardSnapshot, DecodeError>;

    /// Whether this codec carries image snapshots at all.
    fn supports_images(&self) -> bool;
}

/// Full codec: `text:<utf8>` and `image:<base64 png>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaggedCodec;

impl WireCodec for TaggedCodec {
    fn encode(&self, snapshot: &ClipboardSnapshot) -> String {
        match snapshot {
            ClipboardSnapshot::Text(text) if text.is_empty() => String::new(),
            ClipboardSnapshot::Text(text) => format!("{TEXT_PREFIX}{text}"),
            ClipboardSnapshot::Image(png) => format!("{IMAGE_PREFIX}{}", STANDARD.encode(png)),
        }
    }

    fn decode(&self, wire: &str) -> Result<ClipboardSnapshot, DecodeError> {
        if let Some(text) = wire.strip_prefix(TEXT_PREFIX) {
            return Ok(ClipboardSnapshot::Text(text.to_string()));
        }
        if let Some(payload) = wire.strip_prefix(IMAGE_PREFIX) {
            return decode_png(payload).map(ClipboardSnapshot::Image);
        }
        Err(DecodeError::MissingTag)
    }

    fn supports_images(&self) -> bool {
        true
    }
}

/// Text-only codec. Images encode to nothing and are refused on decode.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextOnlyCodec;

impl WireCodec for TextOnlyCodec {
    fn encode(&self, snapshot: &ClipboardSnapshot) -> String {
        match snapshot {
            ClipboardSnapshot::Text(text) if text.is_empty() => String::new(),
            ClipboardSnapshot::Text(text) => format!("{TEXT_PREFIX}{text}"),
            ClipboardSnapshot::Image(_) => String::new(),
        }
    }

    fn decode(&self, wire: &str) -> Result<ClipboardSnapshot, DecodeError> {
        if let Some(text) = wire.strip_prefix(TEXT_PREFIX) {
            return Ok(ClipboardSnapshot::Text(text.to_string()));
        }
        if wire.starts_with(IMAGE_PREFIX) {
            return Err(DecodeError::UnsupportedFormat);
        }
        Err(DecodeError::MissingTag)
    }

    fn supports_images(&self) -> bool {
        false
    }
}

/// Base64-decode and check the bytes are a PNG the image decoder accepts.
fn decode_png(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;

    image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|_| DecodeError::UnsupportedFormat)?;

    Ok(bytes)
}
