use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use sn_core::ports::{IdentityProviderPort, TreeStorePort, TreeSubscription};
use sn_core::session::ClipboardSession;
use sn_core::{paths, AccessError, SessionId, SessionStatus, Uid};

/// Open clipboard session.
///
/// Local edits are written to `text` immediately. Remote snapshots are
/// applied only while the session is owned by the currently signed-in
/// principal; anything else is dropped. Dropping the handle (or calling
/// [`ClipboardSessionHandle::close`]) ends the subscription.
pub struct ClipboardSessionHandle {
    session_id: SessionId,
    uid: Uid,
    identity: Arc<dyn IdentityProviderPort>,
    store: Arc<dyn TreeStorePort>,
    subscription: TreeSubscription,
    status: SessionStatus,
    text: String,
}

impl ClipboardSessionHandle {
    pub(crate) fn new(
        session_id: SessionId,
        uid: Uid,
        identity: Arc<dyn IdentityProviderPort>,
        store: Arc<dyn TreeStorePort>,
        subscription: TreeSubscription,
        status: SessionStatus,
        text: String,
    ) -> Self {
        Self {
            session_id,
            uid,
            identity,
            store,
            subscription,
            status,
            text,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Write a local edit through to the shared tree.
    ///
    /// The status reads "Updating..." until the next remote snapshot confirms
    /// the write.
    pub async fn edit_text(&mut self, text: impl Into<String>) -> Result<(), AccessError> {
        let text = text.into();
        self.text.clone_from(&text);
        self.status = SessionStatus::Updating;

        if let Err(err) = self
            .store
            .write(&paths::session_text(&self.session_id), Value::String(text))
            .await
        {
            warn!(session_id = %self.session_id, error = %err, "text write rejected");
            self.status = SessionStatus::PermissionDenied;
            return Err(err.into());
        }
        Ok(())
    }

    /// Wait for the next remote snapshot that may be shown.
    ///
    /// Snapshots of a session that is absent, unowned or owned by someone
    /// other than the current principal are skipped.
    pub async fn next_change(&mut self) -> Result<String, AccessError> {
        loop {
            let snapshot: Option<ClipboardSession> = self.subscription.next_as().await?;
            let current = self.identity.current_uid();

            match snapshot {
                Some(session) if current.as_ref().is_some_and(|uid| session.is_owned_by(uid)) => {
                    self.text.clone_from(&session.text);
                    self.status = SessionStatus::Synced;
                    return Ok(session.text);
                }
                _ => debug!(session_id = %self.session_id, "skipping snapshot not owned by current principal"),
            }
        }
    }

    /// Leave the session. Equivalent to dropping the handle.
    pub fn close(self) {
        debug!(session_id = %self.session_id, "clipboard session closed");
    }
}

impl fmt::Debug for ClipboardSessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardSessionHandle")
            .field("session_id", &self.session_id)
            .field("uid", &self.uid)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_infra::{InMemoryTreeStore, LocalAnonymousIdentity};

    async fn open(
        store: &InMemoryTreeStore,
        identity: Arc<LocalAnonymousIdentity>,
    ) -> ClipboardSessionHandle {
        crate::usecases::OpenClipboardSession::new(identity, Arc::new(store.clone()))
            .execute(&SessionId::from("abc"))
            .await
            .expect("session opens")
    }

    #[tokio::test]
    async fn edit_is_written_and_confirmed_by_snapshot() {
        let store = InMemoryTreeStore::new();
        let mut handle = open(&store, Arc::new(LocalAnonymousIdentity::with_uid("alice".into()))).await;
        assert_eq!(handle.status(), SessionStatus::Created);

        // Initial snapshot of the freshly created node.
        assert_eq!(handle.next_change().await.unwrap(), "");

        handle.edit_text("hello").await.unwrap();
        assert_eq!(handle.status(), SessionStatus::Updating);

        assert_eq!(handle.next_change().await.unwrap(), "hello");
        assert_eq!(handle.status(), SessionStatus::Synced);
    }

    #[tokio::test]
    async fn snapshot_after_ownership_change_is_skipped() {
        let store = InMemoryTreeStore::new();
        let mut handle = open(&store, Arc::new(LocalAnonymousIdentity::with_uid("alice".into()))).await;
        handle.next_change().await.unwrap();

        let node = paths::session(&SessionId::from("abc"));
        store
            .write(&node, serde_json::json!({"owner": "mallory", "text": "hijacked"}))
            .await
            .unwrap();
        store
            .write(&node, serde_json::json!({"owner": "alice", "text": "restored"}))
            .await
            .unwrap();

        assert_eq!(handle.next_change().await.unwrap(), "restored");
    }

    #[tokio::test]
    async fn closing_releases_the_subscription() {
        let store = InMemoryTreeStore::new();
        let handle = open(&store, Arc::new(LocalAnonymousIdentity::with_uid("alice".into()))).await;
        assert_eq!(store.subscriber_count(), 1);

        handle.close();
        assert_eq!(store.subscriber_count(), 0);
    }
}
