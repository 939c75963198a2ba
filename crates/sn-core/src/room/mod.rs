//! Rooms: ownership, join requests and the shared clipboard.

mod access;
mod model;

pub use access::{RoomAccessAction, RoomAccessEvent, RoomAccessState, RoomAccessStateMachine};
pub use model::{flagged_uids, membership_flags, Room};
