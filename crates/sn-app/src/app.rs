use crate::usecases::{ClipboardCapture, JoinRoom, OpenClipboardSession};
use crate::AppDeps;

/// Assembled application: hands out use cases wired to one set of ports.
///
/// One `App` corresponds to one principal (one identity provider), the way
/// one browser session does.
pub struct App {
    deps: AppDeps,
}

impl App {
    /// This constructor signature IS the dependency manifest.
    pub fn new(deps: AppDeps) -> Self {
        Self { deps }
    }

    pub fn deps(&self) -> &AppDeps {
        &self.deps
    }

    pub fn open_clipboard_session(&self) -> OpenClipboardSession {
        OpenClipboardSession::new(self.deps.identity.clone(), self.deps.store.clone())
    }

    pub fn join_room(&self) -> JoinRoom {
        JoinRoom::new(
            self.deps.identity.clone(),
            self.deps.store.clone(),
            self.deps.clock.clone(),
        )
    }

    pub fn clipboard_capture(&self) -> ClipboardCapture {
        ClipboardCapture::new(self.deps.files.clone())
    }
}
