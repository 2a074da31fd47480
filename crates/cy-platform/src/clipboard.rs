//! System clipboard adapter backed by clipboard-rs.
//!
//! Reads are normalized before they reach the hub:
//! - text wins when both text and an image are present
//! - empty text counts as no content
//! - images are re-encoded to PNG
//!
//! In text-only mode images are neither read nor written.

use std::sync::{Arc, Mutex};

use clipboard_rs::common::RustImage;
use clipboard_rs::{Clipboard, ClipboardContext, ContentFormat, RustImageData};
use tracing::{debug, debug_span};

use cy_core::ports::ClipboardPort;
use cy_core::{ClipboardError, ClipboardSnapshot};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

pub struct LocalClipboard {
    inner: Arc<Mutex<ClipboardContext>>,
    images: bool,
}

impl LocalClipboard {
    /// Open the system clipboard. `images = false` selects text-only mode.
    pub fn new(images: bool) -> Result<Self, ClipboardError> {
        let context = ClipboardContext::new()
            .map_err(|e| ClipboardError::Unavailable(format!("failed to open clipboard: {e}")))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(context)),
            images,
        })
    }

    pub fn supports_images(&self) -> bool {
        self.images
    }

    fn context(&self) -> Result<std::sync::MutexGuard<'_, ClipboardContext>, ClipboardError> {
        self.inner
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".into()))
    }
}

impl ClipboardPort for LocalClipboard {
    fn read(&self) -> Result<Option<ClipboardSnapshot>, ClipboardError> {
        let span = debug_span!("platform.read_clipboard", images = self.images);
        span.in_scope(|| {
            let ctx = self.context()?;

            let text = if ctx.has(ContentFormat::Text) {
                Some(ctx.get_text().map_err(read_err)?)
            } else {
                None
            };

            let images = self.images;
            normalize(text, images, || {
                if !ctx.has(ContentFormat::Image) {
                    return Ok(None);
                }
                let png = ctx.get_image().and_then(|img| img.to_png()).map_err(read_err)?;
                Ok(Some(png.get_bytes().to_vec()))
            })
        })
    }

    fn write(&self, snapshot: &ClipboardSnapshot) -> Result<(), ClipboardError> {
        let span = debug_span!("platform.write_clipboard", content = %snapshot);
        span.in_scope(|| {
            let ctx = self.context()?;
            match snapshot {
                ClipboardSnapshot::Text(text) => {
                    ctx.set_text(text.clone()).map_err(write_err)?;
                }
                ClipboardSnapshot::Image(png) => {
                    if !self.images {
                        return Err(ClipboardError::Write(
                            "image support is disabled".to_string(),
                        ));
                    }
                    let img = RustImageData::from_bytes(png).map_err(write_err)?;
                    ctx.set_image(img).map_err(write_err)?;
                }
            }
            debug!("wrote clipboard");
            Ok(())
        })
    }
}

/// Apply the read priority rules. `read_png` is only called when needed.
fn normalize<F>(
    text: Option<String>,
    images: bool,
    read_png: F,
) -> Result<Option<ClipboardSnapshot>, ClipboardError>
where
    F: FnOnce() -> Result<Option<Vec<u8>>, ClipboardError>,
{
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        return Ok(Some(ClipboardSnapshot::Text(text)));
    }
    if !images {
        return Ok(None);
    }
    Ok(read_png()?
        .filter(|png| !png.is_empty())
        .map(ClipboardSnapshot::Image))
}

fn read_err(e: BoxedError) -> ClipboardError {
    ClipboardError::Read(e.to_string())
}

fn write_err(e: BoxedError) -> ClipboardError {
    ClipboardError::Write(e.to_string())
}
