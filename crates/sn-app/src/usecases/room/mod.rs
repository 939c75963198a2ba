mod events;
mod join_room;
mod room_session;

pub use events::{RoomEvent, RoomView};
pub use join_room::JoinRoom;
pub use room_session::RoomSession;
