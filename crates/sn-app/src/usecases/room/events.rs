use serde::Serialize;

use sn_core::{ClipboardPayload, RoomAccessState, RoomId, Uid};

/// Something the room screen should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// Owner only: the set of pending join requests changed.
    RequestsChanged(Vec<Uid>),
    /// The owner approved this principal; the shared clipboard is now visible.
    Approved,
    ClipboardChanged(ClipboardPayload),
    /// The clipboard holds a payload this client cannot show.
    ClipboardUnreadable { reason: String },
    /// The room node disappeared. The session is over.
    RoomDeleted,
}

/// Projection of the room as seen by one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_id: RoomId,
    pub uid: Uid,
    pub state: RoomAccessState,
    pub role: &'static str,
    pub pending_requests: Vec<Uid>,
    pub clipboard: Option<ClipboardPayload>,
}
