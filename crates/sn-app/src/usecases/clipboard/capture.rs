//! Turns local input (typed text, picked files) into clipboard payloads.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use sn_core::clipboard::classify_media;
use sn_core::ports::FileReaderPort;
use sn_core::{ClipboardPayload, DataUrl, FileBlob};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("{name}: media type {mime:?} cannot be shared")]
    UnsupportedMediaType { name: String, mime: String },

    #[error("cannot read {path}: {reason}")]
    Read { path: String, reason: String },
}

/// Holds the most recent local payload awaiting a share.
///
/// Text is taken verbatim. Files are classified by their declared media
/// type: `image/*`, `video/*` and `application/*` become image, video and
/// document payloads; everything else is refused.
pub struct ClipboardCapture {
    files: Arc<dyn FileReaderPort>,
    latest: Option<ClipboardPayload>,
}

impl ClipboardCapture {
    pub fn new(files: Arc<dyn FileReaderPort>) -> Self {
        Self {
            files,
            latest: None,
        }
    }

    /// Empty input is ignored and leaves the previous payload in place.
    pub fn capture_text(&mut self, text: &str) -> Option<&ClipboardPayload> {
        if text.is_empty() {
            debug!("ignoring empty text");
            return None;
        }
        self.latest = Some(ClipboardPayload::Text(text.to_string()));
        self.latest.as_ref()
    }

    pub fn capture_blob(&mut self, blob: FileBlob) -> Result<&ClipboardPayload, CaptureError> {
        let payload = classify_media(&blob.mime)
            .and_then(|kind| ClipboardPayload::binary(kind, DataUrl::encode(&blob.mime, &blob.bytes)))
            .ok_or_else(|| CaptureError::UnsupportedMediaType {
                name: blob.name.clone(),
                mime: blob.mime.clone(),
            })?;

        info!(name = %blob.name, summary = %payload.summary(), "file captured");
        Ok(self.latest.insert(payload))
    }

    /// Read a local file and capture it. `declared_mime` overrides the
    /// adapter's guess.
    pub async fn capture_file(
        &mut self,
        path: &Path,
        declared_mime: Option<&str>,
    ) -> Result<&ClipboardPayload, CaptureError> {
        let blob = self
            .files
            .read_blob(path, declared_mime)
            .await
            .map_err(|err| CaptureError::Read {
                path: path.display().to_string(),
                reason: format!("{err:#}"),
            })?;
        self.capture_blob(blob)
    }

    pub fn latest(&self) -> Option<&ClipboardPayload> {
        self.latest.as_ref()
    }

    /// Hand out the pending payload, leaving nothing captured.
    pub fn take(&mut self) -> Option<ClipboardPayload> {
        self.latest.take()
    }
}
