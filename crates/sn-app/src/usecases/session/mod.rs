mod handle;
mod open_session;

pub use handle::ClipboardSessionHandle;
pub use open_session::OpenClipboardSession;
