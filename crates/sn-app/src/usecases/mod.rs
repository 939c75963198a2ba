//! Business logic use cases
//!
//! ```text
//! OpenClipboardSession ─► ClipboardSessionHandle   (owner-gated text)
//! JoinRoom             ─► RoomSession              (approve / share / leave / delete)
//! ClipboardCapture     ─► ClipboardPayload         ─► RoomSession::share
//! ```

pub mod clipboard;
pub mod room;
pub mod session;

/// Read-decide-write rounds before a contended bootstrap gives up.
pub(crate) const MAX_BOOTSTRAP_ROUNDS: usize = 3;

pub use clipboard::{CaptureError, ClipboardCapture};
pub use room::{JoinRoom, RoomEvent, RoomSession, RoomView};
pub use session::{ClipboardSessionHandle, OpenClipboardSession};
