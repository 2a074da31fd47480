//! Clipboard domain: the comparable snapshot and its wire representation.

mod codec;
mod snapshot;

pub use codec::{TaggedCodec, TextOnlyCodec, WireCodec, IMAGE_PREFIX, TEXT_PREFIX};
pub use snapshot::ClipboardSnapshot;
