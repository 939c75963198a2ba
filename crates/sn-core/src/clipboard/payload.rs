use std::fmt;

use serde::{Deserialize, Serialize};

use super::DataUrl;

/// Kind tag of a [`ClipboardPayload`], as stored in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Text,
    Image,
    Video,
    Doc,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Text => "text",
            PayloadKind::Image => "image",
            PayloadKind::Video => "video",
            PayloadKind::Doc => "doc",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single clipboard object shared by every approved room participant.
///
/// Stored as `{ "type": ..., "content": ... }`. Writing a payload replaces the
/// previous one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ClipboardPayload {
    Text(String),
    Image(DataUrl),
    Video(DataUrl),
    Doc(DataUrl),
}

impl ClipboardPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            ClipboardPayload::Text(_) => PayloadKind::Text,
            ClipboardPayload::Image(_) => PayloadKind::Image,
            ClipboardPayload::Video(_) => PayloadKind::Video,
            ClipboardPayload::Doc(_) => PayloadKind::Doc,
        }
    }

    /// Build a binary payload of the given kind. `Text` is not a binary kind.
    pub fn binary(kind: PayloadKind, url: DataUrl) -> Option<Self> {
        match kind {
            PayloadKind::Text => None,
            PayloadKind::Image => Some(ClipboardPayload::Image(url)),
            PayloadKind::Video => Some(ClipboardPayload::Video(url)),
            PayloadKind::Doc => Some(ClipboardPayload::Doc(url)),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ClipboardPayload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_data_url(&self) -> Option<&DataUrl> {
        match self {
            ClipboardPayload::Text(_) => None,
            ClipboardPayload::Image(url) | ClipboardPayload::Video(url) | ClipboardPayload::Doc(url) => {
                Some(url)
            }
        }
    }

    /// One-line human description, used by the CLI and in logs.
    pub fn summary(&self) -> String {
        match self {
            ClipboardPayload::Text(text) => format!("text ({} chars)", text.chars().count()),
            ClipboardPayload::Image(url) => format!("image {} ({} b64 bytes)", url.mime(), url.encoded_len()),
            ClipboardPayload::Video(url) => format!("video {} ({} b64 bytes)", url.mime(), url.encoded_len()),
            ClipboardPayload::Doc(url) => format!("document {} ({} b64 bytes)", url.mime(), url.encoded_len()),
        }
    }
}
