use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ids::Uid;

/// Owner-gated text node stored at `snappi_clipboard/{sessionId}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClipboardSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uid>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
}

/// Anything but a string reads as empty text.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Ok(text),
        None | Some(Value::Null) => Ok(String::new()),
        Some(_other) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(found = %_other, "session text is not a string, reading it as empty");
            Ok(String::new())
        }
    }
}

impl ClipboardSession {
    pub fn owned_by(owner: Uid) -> Self {
        Self {
            owner: Some(owner),
            text: String::new(),
        }
    }

    pub fn is_owned_by(&self, uid: &Uid) -> bool {
        self.owner.as_ref() == Some(uid)
    }
}
