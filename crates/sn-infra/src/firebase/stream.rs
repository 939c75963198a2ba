//! Realtime Database streaming protocol carried by server-sent events.

use serde::Deserialize;
use serde_json::Value;

use sn_core::tree::{merge_at, normalize, set_at, TreePath, TreeValue};

#[derive(Debug, Deserialize)]
struct PathData {
    path: String,
    data: Value,
}

/// Decoded streaming event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Replace the node at `path` (relative to the watched location).
    Put { path: TreePath, data: Value },
    /// Replace each named child below `path`.
    Patch { path: TreePath, data: Value },
    KeepAlive,
    /// The server stopped the stream (security rules changed).
    Cancel(String),
    /// The auth token expired or was revoked.
    AuthRevoked,
    Unknown(String),
}

impl StreamEvent {
    /// Decode one server-sent event from its `event` name and `data` field.
    pub fn parse(event: &str, data: &str) -> Result<Self, String> {
        match event {
            "put" | "patch" => {
                let body: PathData = serde_json::from_str(data)
                    .map_err(|e| format!("malformed {event} payload: {e}"))?;
                let path = TreePath::parse(&body.path)
                    .map_err(|e| format!("malformed {event} path: {e}"))?;
                if event == "put" {
                    Ok(StreamEvent::Put {
                        path,
                        data: body.data,
                    })
                } else {
                    Ok(StreamEvent::Patch {
                        path,
                        data: body.data,
                    })
                }
            }
            "keep-alive" => Ok(StreamEvent::KeepAlive),
            "cancel" => Ok(StreamEvent::Cancel(data.to_string())),
            "auth_revoked" => Ok(StreamEvent::AuthRevoked),
            other => Ok(StreamEvent::Unknown(other.to_string())),
        }
    }
}

/// Local mirror of the watched subtree.
#[derive(Debug, Default)]
pub struct StreamCache {
    value: TreeValue,
    primed: bool,
}

impl StreamCache {
    /// Apply `event`; returns the new snapshot when the mirror changed, and
    /// always for the first `put` (the server's initial state).
    pub fn apply(&mut self, event: StreamEvent) -> Option<Option<TreeValue>> {
        let before = self.value.clone();
        let initial = !self.primed && matches!(event, StreamEvent::Put { .. });
        match event {
            StreamEvent::Put { path, data } => set_at(&mut self.value, &path, data),
            StreamEvent::Patch { path, data } => match data {
                Value::Object(children) => merge_at(&mut self.value, &path, children),
                other => set_at(&mut self.value, &path, other),
            },
            _ => return None,
        }
        self.value = normalize(std::mem::take(&mut self.value));
        self.primed |= initial;
        if self.value == before && !initial {
            return None;
        }
        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> Option<TreeValue> {
        if self.value.is_null() {
            None
        } else {
            Some(self.value.clone())
        }
    }
}
