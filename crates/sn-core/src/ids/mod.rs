//! ID type wrappers for type safety.

mod id_macro;
pub mod scope_id;
pub mod uid;

pub use scope_id::{InvalidIdError, RoomId, SessionId};
pub use uid::Uid;
