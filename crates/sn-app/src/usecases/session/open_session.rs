//! Use case for opening a single-owner clipboard session.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use sn_core::ports::{decode, encode, IdentityProviderPort, TreeStorePort};
use sn_core::session::{ClipboardSession, SessionAccessPolicy, SessionDecision};
use sn_core::{paths, AccessError, SessionId, SessionStatus, Uid};

use super::ClipboardSessionHandle;
use crate::usecases::MAX_BOOTSTRAP_ROUNDS;

/// Opens `snappi_clipboard/{sessionId}` for the signed-in principal.
///
/// ## Behavior
/// - Absent session: created with the caller as owner and empty text
/// - Session without owner: claimed, existing text kept
/// - Session owned by the caller: resumed
/// - Session owned by someone else: [`AccessError::AccessDenied`], nothing written
///
/// Creation and claiming are compare-and-set writes. A principal that loses
/// the race re-reads and decides again, so two first visitors never both end
/// up believing they own the session.
pub struct OpenClipboardSession {
    identity: Arc<dyn IdentityProviderPort>,
    store: Arc<dyn TreeStorePort>,
}

impl OpenClipboardSession {
    pub fn new(identity: Arc<dyn IdentityProviderPort>, store: Arc<dyn TreeStorePort>) -> Self {
        Self { identity, store }
    }

    pub async fn execute(
        &self,
        session_id: &SessionId,
    ) -> Result<ClipboardSessionHandle, AccessError> {
        let span = info_span!(
            "usecase.open_clipboard_session.execute",
            session_id = %session_id,
        );

        async {
            let uid = self.identity.authenticate_anonymously().await?;
            info!(uid = %uid, "signed in");

            let (status, text) = self.bootstrap(session_id, &uid).await?;
            let subscription = self.store.subscribe(&paths::session(session_id)).await?;

            info!(status = %status, "clipboard session opened");
            Ok(ClipboardSessionHandle::new(
                session_id.clone(),
                uid,
                self.identity.clone(),
                self.store.clone(),
                subscription,
                status,
                text,
            ))
        }
        .instrument(span)
        .await
    }

    async fn bootstrap(
        &self,
        session_id: &SessionId,
        uid: &Uid,
    ) -> Result<(SessionStatus, String), AccessError> {
        let node = paths::session(session_id);

        for round in 1..=MAX_BOOTSTRAP_ROUNDS {
            let existing: Option<ClipboardSession> =
                decode(&node, self.store.read(&node).await?)?;

            match SessionAccessPolicy::decide(existing.as_ref(), uid) {
                SessionDecision::Create => {
                    let fresh = encode(&node, &ClipboardSession::owned_by(uid.clone()))?;
                    if self.store.compare_and_set(&node, None, fresh).await? {
                        return Ok((SessionStatus::Created, String::new()));
                    }
                }
                SessionDecision::Claim => {
                    let owner_path = paths::session_owner(session_id);
                    let owner = encode(&owner_path, uid)?;
                    if self.store.compare_and_set(&owner_path, None, owner).await? {
                        let text = existing.map(|session| session.text).unwrap_or_default();
                        return Ok((SessionStatus::Claimed, text));
                    }
                }
                SessionDecision::Resume => {
                    let text = existing.map(|session| session.text).unwrap_or_default();
                    return Ok((SessionStatus::Synced, text));
                }
                SessionDecision::Deny { owner } => {
                    warn!(owner = %owner, "session belongs to another principal");
                    return Err(AccessError::AccessDenied);
                }
            }

            debug!(round, "session changed underneath us, deciding again");
        }

        Err(AccessError::Contended(node.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::predicate::*;
    use serde_json::json;
    use sn_core::ports::{AuthError, StoreError, TreeSubscription};
    use sn_core::{TreePath, TreeValue};
    use tokio::sync::mpsc;

    mockall::mock! {
        Store {}

        #[async_trait]
        impl TreeStorePort for Store {
            async fn read(&self, path: &TreePath) -> Result<Option<TreeValue>, StoreError>;
            async fn write(&self, path: &TreePath, value: TreeValue) -> Result<(), StoreError>;
            async fn compare_and_set(
                &self,
                path: &TreePath,
                expected: Option<TreeValue>,
                value: TreeValue,
            ) -> Result<bool, StoreError>;
            async fn subscribe(&self, path: &TreePath) -> Result<TreeSubscription, StoreError>;
        }
    }

    mockall::mock! {
        Identity {}

        #[async_trait]
        impl IdentityProviderPort for Identity {
            async fn authenticate_anonymously(&self) -> Result<Uid, AuthError>;
            fn current_uid(&self) -> Option<Uid>;
        }
    }

    fn signed_in(uid: &str) -> MockIdentity {
        let mut identity = MockIdentity::new();
        let uid = Uid::from(uid);
        let current = uid.clone();
        identity
            .expect_authenticate_anonymously()
            .returning(move || Ok(uid.clone()));
        identity
            .expect_current_uid()
            .returning(move || Some(current.clone()));
        identity
    }

    fn idle_subscription(path: &TreePath) -> TreeSubscription {
        let (_tx, rx) = mpsc::unbounded_channel();
        TreeSubscription::new(path.clone(), rx, || {})
    }

    fn use_case(identity: MockIdentity, store: MockStore) -> OpenClipboardSession {
        OpenClipboardSession::new(Arc::new(identity), Arc::new(store))
    }

    #[tokio::test]
    async fn foreign_owner_is_denied_without_writes() {
        let mut store = MockStore::new();
        store
            .expect_read()
            .returning(|_| Ok(Some(json!({"owner": "alice", "text": "secret"}))));
        store.expect_compare_and_set().never();
        store.expect_write().never();
        store.expect_subscribe().never();

        let result = use_case(signed_in("bob"), store)
            .execute(&SessionId::from("abc"))
            .await;

        let err = result.expect_err("bob must be denied");
        assert_eq!(err, AccessError::AccessDenied);
        assert_eq!(err.status(), SessionStatus::AccessDenied);
    }

    #[tokio::test]
    async fn lost_creation_race_rereads_and_is_denied() {
        let mut store = MockStore::new();
        let mut reads = 0;
        store.expect_read().times(2).returning(move |_| {
            reads += 1;
            if reads == 1 {
                Ok(None)
            } else {
                Ok(Some(json!({"owner": "alice", "text": ""})))
            }
        });
        store
            .expect_compare_and_set()
            .with(always(), eq(None), always())
            .times(1)
            .returning(|_, _, _| Ok(false));

        let err = use_case(signed_in("bob"), store)
            .execute(&SessionId::from("abc"))
            .await
            .expect_err("alice won the race");

        assert_eq!(err, AccessError::AccessDenied);
    }

    #[tokio::test]
    async fn claim_writes_only_the_owner_field() {
        let mut store = MockStore::new();
        store
            .expect_read()
            .returning(|_| Ok(Some(json!({"text": "left behind"}))));
        store
            .expect_compare_and_set()
            .withf(|path, expected, value| {
                path.to_string() == "snappi_clipboard/abc/owner"
                    && expected.is_none()
                    && *value == json!("bob")
            })
            .times(1)
            .returning(|_, _, _| Ok(true));
        store
            .expect_subscribe()
            .returning(|path| Ok(idle_subscription(path)));

        let handle = use_case(signed_in("bob"), store)
            .execute(&SessionId::from("abc"))
            .await
            .expect("claim succeeds");

        assert_eq!(handle.status(), SessionStatus::Claimed);
        assert_eq!(handle.text(), "left behind");
    }

    #[tokio::test]
    async fn persistent_contention_gives_up() {
        let mut store = MockStore::new();
        store
            .expect_read()
            .times(MAX_BOOTSTRAP_ROUNDS)
            .returning(|_| Ok(None));
        store
            .expect_compare_and_set()
            .times(MAX_BOOTSTRAP_ROUNDS)
            .returning(|_, _, _| Ok(false));

        let err = use_case(signed_in("bob"), store)
            .execute(&SessionId::from("abc"))
            .await
            .expect_err("never wins");

        assert!(matches!(err, AccessError::Contended(path) if path == "snappi_clipboard/abc"));
    }

    #[tokio::test]
    async fn store_failure_maps_to_permission_denied() {
        let mut store = MockStore::new();
        store.expect_read().returning(|path| {
            Err(StoreError::Rejected {
                operation: "read",
                path: path.to_string(),
                reason: "Permission denied".into(),
            })
        });

        let err = use_case(signed_in("bob"), store)
            .execute(&SessionId::from("abc"))
            .await
            .expect_err("read rejected");

        assert_eq!(err.status(), SessionStatus::PermissionDenied);
    }

    #[tokio::test]
    async fn auth_failure_touches_nothing() {
        let mut identity = MockIdentity::new();
        identity
            .expect_authenticate_anonymously()
            .returning(|| Err(AuthError::Denied("ADMIN_ONLY_OPERATION".into())));
        let mut store = MockStore::new();
        store.expect_read().never();

        let err = use_case(identity, store)
            .execute(&SessionId::from("abc"))
            .await
            .expect_err("auth fails");

        assert!(matches!(err, AccessError::Authentication(_)));
        assert_eq!(err.status(), SessionStatus::PermissionDenied);
    }
}
