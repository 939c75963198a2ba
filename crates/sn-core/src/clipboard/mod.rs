//! Clipboard payload model.

mod blob;
mod data_url;
mod media;
mod payload;

pub use blob::FileBlob;
pub use data_url::{DataUrl, DataUrlError};
pub use media::classify_media;
pub use payload::{ClipboardPayload, PayloadKind};
