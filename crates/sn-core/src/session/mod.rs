//! Owner-gated clipboard sessions.

mod model;
mod policy;
mod status;

pub use model::ClipboardSession;
pub use policy::{SessionAccessPolicy, SessionDecision};
pub use status::SessionStatus;
