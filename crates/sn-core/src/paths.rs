//! Key layout of the shared tree.
//!
//! ```text
//! snappi_clipboard/{sessionId}           = { owner, text }
//! rooms/{roomId}                         = { owner, createdAt, participants, requests, clipboard }
//! rooms/{roomId}/participants/{uid}      = true | absent
//! rooms/{roomId}/requests/{uid}          = true | absent
//! rooms/{roomId}/clipboard               = { type, content }
//! ```

use crate::ids::{RoomId, SessionId, Uid};
use crate::tree::TreePath;

pub const SESSIONS_ROOT: &str = "snappi_clipboard";
pub const ROOMS_ROOT: &str = "rooms";

pub fn session(id: &SessionId) -> TreePath {
    TreePath::root().child(SESSIONS_ROOT).child(id)
}

pub fn session_owner(id: &SessionId) -> TreePath {
    session(id).child("owner")
}

pub fn session_text(id: &SessionId) -> TreePath {
    session(id).child("text")
}

pub fn room(id: &RoomId) -> TreePath {
    TreePath::root().child(ROOMS_ROOT).child(id)
}

pub fn room_participants(id: &RoomId) -> TreePath {
    room(id).child("participants")
}

pub fn room_participant(id: &RoomId, uid: &Uid) -> TreePath {
    room_participants(id).child(uid)
}

pub fn room_requests(id: &RoomId) -> TreePath {
    room(id).child("requests")
}

pub fn room_request(id: &RoomId, uid: &Uid) -> TreePath {
    room_requests(id).child(uid)
}

pub fn room_clipboard(id: &RoomId) -> TreePath {
    room(id).child("clipboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_stored_keys() {
        let room_id = RoomId::from("42");
        let uid = Uid::from("bob");
        let session_id = SessionId::from("abc");

        assert_eq!(session(&session_id).to_string(), "snappi_clipboard/abc");
        assert_eq!(session_text(&session_id).to_string(), "snappi_clipboard/abc/text");
        assert_eq!(room(&room_id).to_string(), "rooms/42");
        assert_eq!(
            room_participant(&room_id, &uid).to_string(),
            "rooms/42/participants/bob"
        );
        assert_eq!(room_request(&room_id, &uid).to_string(), "rooms/42/requests/bob");
        assert_eq!(room_clipboard(&room_id).to_string(), "rooms/42/clipboard");
    }
}
